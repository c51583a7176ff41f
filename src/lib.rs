/// License Report - groups the files of a source tree by license statement
///
/// This library greps a directory tree for lines mentioning "license", collects
/// the contiguous matches of each file into a license block, and reports which
/// files share an identical block. Files with unusual boilerplate stand out.

pub mod core;
pub mod utils;

// Re-export main types for convenience
pub use crate::core::grouper::{
    group_hits, group_records, Grouper, Hit, LicenseBlock, LicenseGroups, LicenseText,
    MalformedRecord,
};
pub use crate::core::searcher::{SearchCommand, SearchError, SearchProcess};
pub use crate::utils::output_formatter::{format_report, write_report, ReportOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scan `root` and render the license report
///
/// This is a convenience function for simple use cases.
///
/// # Arguments
///
/// * `root` - Directory to search
/// * `options` - Report rendering options
///
/// # Returns
///
/// The rendered report, empty when no license lines were found
pub fn generate_report<P: AsRef<std::path::Path>>(
    root: P,
    options: &ReportOptions,
) -> anyhow::Result<String> {
    let groups = app::collect_licenses(&SearchCommand::new(root))?;
    Ok(format_report(&groups, options))
}

/// Command-line application functionality
pub mod app {
    use anyhow::{Context, Result};

    use crate::core::grouper::{group_records, LicenseGroups};
    use crate::core::searcher::SearchCommand;

    /// Run the search and group its output
    ///
    /// The search process is always reaped. If grouping fails, the process is
    /// dropped before the error is returned and no groups are produced.
    ///
    /// # Arguments
    ///
    /// * `command` - The search to run
    ///
    /// # Returns
    ///
    /// Files grouped by license text
    pub fn collect_licenses(command: &SearchCommand) -> Result<LicenseGroups> {
        let mut search = command
            .spawn()
            .with_context(|| format!("Failed to search {}", command.root().display()))?;

        let groups = group_records(search.by_ref())?;

        search
            .finish()
            .with_context(|| format!("Search of {} failed", command.root().display()))?;

        Ok(groups)
    }
}
