/// Output formatter for license reports
///
/// This module renders license groups as the plain text report printed to the
/// terminal: each statement followed by the files that carry it.

use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::grouper::{LicenseGroups, LicenseText};

/// Options controlling how the report is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Order groups by frequency and filenames alphabetically
    pub sort: bool,
    /// Wrap the report in a markdown code fence
    pub markdown: bool,
    /// Colorize filenames
    pub color: bool,
}

/// Format license groups for console output
///
/// # Arguments
///
/// * `groups` - Files grouped by license text
/// * `options` - Rendering options
///
/// # Returns
///
/// The report text; empty when there are no groups
pub fn format_report(groups: &LicenseGroups, options: &ReportOptions) -> String {
    if groups.is_empty() {
        return String::new();
    }

    let mut output = String::new();

    if options.markdown {
        output.push_str("```\n");
    }

    if options.sort {
        for (text, filenames) in groups.sorted() {
            push_group(&mut output, text, filenames.into_iter(), options);
        }
    } else {
        for (text, filenames) in groups {
            push_group(&mut output, text, filenames.iter(), options);
        }
    }

    if options.markdown {
        output.push_str("```\n");
    }

    output
}

/// Write the formatted report to `writer`
pub fn write_report<W: Write>(
    groups: &LicenseGroups,
    options: &ReportOptions,
    writer: &mut W,
) -> Result<()> {
    writer
        .write_all(format_report(groups, options).as_bytes())
        .context("Failed to write license report")?;
    writer.flush().context("Failed to flush license report")?;
    Ok(())
}

fn push_group<'a, I>(output: &mut String, text: &LicenseText, filenames: I, options: &ReportOptions)
where
    I: Iterator<Item = &'a String>,
{
    let content = text.content();
    output.push_str(&content);
    if !content.ends_with('\n') {
        output.push('\n');
    }

    for filename in filenames {
        if options.color {
            output.push_str(&format!("\t{}\n", filename.cyan()));
        } else {
            output.push_str(&format!("\t{}\n", filename));
        }
    }

    output.push('\n');
}
