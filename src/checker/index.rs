//! The known-vulnerability index.
//!
//! Loads a CSV of `packageName,packageVersion` pairs (one header line,
//! then one pair per line) into a lookup table from package name to the
//! versions known to be compromised for that package.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Immutable lookup table from package name to known-vulnerable versions.
///
/// Names are case-sensitive. Versions for a package keep the order they
/// appeared in the source file, duplicates included.
#[derive(Debug, Clone, Default)]
pub struct VulnerabilityIndex {
    packages: HashMap<String, Vec<String>>,
}

impl VulnerabilityIndex {
    /// Loads the index from a CSV file.
    ///
    /// The first line is a header and is discarded. Each remaining line is
    /// split on commas; the first two fields are the package name and the
    /// version, with whitespace trimmed from the version (this also strips
    /// the `\r` of CRLF line endings). Lines missing either field are
    /// skipped silently. The file is streamed line by line, never buffered
    /// whole.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a line cannot be
    /// read as UTF-8 text.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open vulnerability list: {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut packages: HashMap<String, Vec<String>> = HashMap::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read {} line {}", path.display(), line_no + 1))?;

            // First line is the header
            if line_no == 0 {
                continue;
            }

            let mut fields = line.split(',');
            let (Some(name), Some(version)) = (fields.next(), fields.next()) else {
                continue;
            };

            let version = version.trim();
            if name.is_empty() || version.is_empty() {
                continue;
            }

            packages
                .entry(name.to_string())
                .or_default()
                .push(version.to_string());
        }

        Ok(Self { packages })
    }

    /// Returns the vulnerable versions recorded for a package, if any.
    pub fn versions(&self, package: &str) -> Option<&[String]> {
        self.packages.get(package).map(|v| v.as_slice())
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    /// Number of distinct package names in the index.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: &[(&str, &[&str])]) -> Self {
        let packages = entries
            .iter()
            .map(|(name, versions)| {
                (
                    name.to_string(),
                    versions.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();
        Self { packages }
    }
}
