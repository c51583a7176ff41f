/// License block grouping
///
/// This file turns the raw search records into per-file license blocks and
/// clusters files whose blocks are identical.

use std::collections::hash_map;
use std::collections::{HashMap, HashSet};
use std::io;

use anyhow::{Context, Result};
use log::{debug, info};

/// Error when a search record carries no filename separator
#[derive(Debug, thiserror::Error)]
#[error("Malformed search record (no null separator): {record:?}")]
pub struct MalformedRecord {
    /// The offending record, lossily decoded
    pub record: String,
}

/// One matching line reported by the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// File the line was found in
    pub filename: String,
    /// Line text, including its line terminator
    pub text: String,
}

impl Hit {
    /// Build a hit from its parts
    pub fn new<F: Into<String>, T: Into<String>>(filename: F, text: T) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    /// Parse a raw `filename\0text` record
    ///
    /// The record is split on its first null byte. Invalid UTF-8 is replaced
    /// rather than rejected.
    ///
    /// # Arguments
    ///
    /// * `record` - One record as read from the search output
    ///
    /// # Returns
    ///
    /// The parsed hit, or `MalformedRecord` when there is no separator
    pub fn parse(record: &[u8]) -> Result<Self, MalformedRecord> {
        let split = record
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| MalformedRecord {
                record: String::from_utf8_lossy(record).into_owned(),
            })?;

        Ok(Self {
            filename: String::from_utf8_lossy(&record[..split]).into_owned(),
            text: String::from_utf8_lossy(&record[split + 1..]).into_owned(),
        })
    }
}

/// The text of a license block, used verbatim as a grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LicenseText(Vec<String>);

impl LicenseText {
    /// Create a key from lines in their original order
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(lines.into_iter().map(Into::into).collect())
    }

    /// Lines of the block
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    /// Lines concatenated with no separator
    pub fn content(&self) -> String {
        self.0.concat()
    }
}

/// Contiguous lines found in a single file
#[derive(Debug, Clone)]
pub struct LicenseBlock {
    filename: String,
    lines: Vec<String>,
}

impl LicenseBlock {
    /// Start a block from its first hit
    pub fn start(hit: Hit) -> Self {
        Self {
            filename: hit.filename,
            lines: vec![hit.text],
        }
    }

    /// File that owns this block
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Number of lines collected so far
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the block holds no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether a line from `filename` continues this block
    pub fn owns(&self, filename: &str) -> bool {
        self.filename == filename
    }

    /// Append a line of the owning file
    pub fn push(&mut self, text: String) {
        self.lines.push(text);
    }
}

/// Files grouped by identical license text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseGroups {
    groups: HashMap<LicenseText, HashSet<String>>,
}

impl LicenseGroups {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `filename` carries `text`
    pub fn insert(&mut self, text: LicenseText, filename: String) {
        self.groups.entry(text).or_default().insert(filename);
    }

    /// Files carrying exactly `text`
    pub fn get(&self, text: &LicenseText) -> Option<&HashSet<String>> {
        self.groups.get(text)
    }

    /// Number of distinct license texts
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no license text was recorded
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct files across all groups
    pub fn file_count(&self) -> usize {
        self.groups
            .values()
            .flatten()
            .collect::<HashSet<_>>()
            .len()
    }

    /// Iterate over groups in unspecified order
    pub fn iter(&self) -> hash_map::Iter<'_, LicenseText, HashSet<String>> {
        self.groups.iter()
    }

    /// Groups ordered by descending file count, then by text, with sorted filenames
    pub fn sorted(&self) -> Vec<(&LicenseText, Vec<&String>)> {
        let mut sorted: Vec<_> = self
            .groups
            .iter()
            .map(|(text, filenames)| {
                let mut filenames: Vec<_> = filenames.iter().collect();
                filenames.sort();
                (text, filenames)
            })
            .collect();
        sorted.sort_by(|(a_text, a_files), (b_text, b_files)| {
            b_files.len().cmp(&a_files.len()).then_with(|| a_text.cmp(b_text))
        });
        sorted
    }
}

impl<'a> IntoIterator for &'a LicenseGroups {
    type Item = (&'a LicenseText, &'a HashSet<String>);
    type IntoIter = hash_map::Iter<'a, LicenseText, HashSet<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accumulates hits into blocks and blocks into groups
#[derive(Debug, Default)]
pub struct Grouper {
    groups: LicenseGroups,
    current: Option<LicenseBlock>,
}

impl Grouper {
    /// Create a grouper with no active block
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw search record and add its hit
    pub fn add_record(&mut self, record: &[u8]) -> Result<(), MalformedRecord> {
        let hit = Hit::parse(record)?;
        self.add_hit(hit);
        Ok(())
    }

    /// Add a hit, closing the active block when the file changes
    pub fn add_hit(&mut self, hit: Hit) {
        if let Some(block) = self.current.as_mut() {
            if block.owns(&hit.filename) {
                block.push(hit.text);
                return;
            }
        }

        self.flush();
        self.current = Some(LicenseBlock::start(hit));
    }

    /// Close the active block and return the populated groups
    pub fn finish(mut self) -> LicenseGroups {
        self.flush();
        self.groups
    }

    fn flush(&mut self) {
        let Some(block) = self.current.take() else {
            return;
        };
        if block.is_empty() {
            return;
        }

        debug!("Closing {}-line block for {}", block.len(), block.filename);
        self.groups
            .insert(LicenseText::new(block.lines), block.filename);
    }
}

/// Group a whole stream of raw search records
///
/// # Arguments
///
/// * `records` - Raw `filename\0text` records in search output order
///
/// # Returns
///
/// The license groups, or the first read error or malformed record
pub fn group_records<I>(records: I) -> Result<LicenseGroups>
where
    I: IntoIterator<Item = io::Result<Vec<u8>>>,
{
    let mut grouper = Grouper::new();

    for record in records {
        let record = record.context("Failed to read search output")?;
        grouper.add_record(&record)?;
    }

    let groups = grouper.finish();
    info!(
        "Found {} distinct license statements across {} files",
        groups.len(),
        groups.file_count()
    );

    Ok(groups)
}

/// Group hits that are already parsed
pub fn group_hits<I>(hits: I) -> LicenseGroups
where
    I: IntoIterator<Item = Hit>,
{
    let mut grouper = Grouper::new();
    for hit in hits {
        grouper.add_hit(hit);
    }
    grouper.finish()
}
