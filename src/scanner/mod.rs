//! Manifest discovery and per-file vulnerability extraction.
//!
//! This module provides the [`ManifestScanner`] trait with one
//! implementation per recognized manifest schema, plus the recursive
//! directory walk that finds the files to scan.
//!
//! | Scanner | File | Shape |
//! |---------|------|-------|
//! | [`FlatManifestScanner`] | `package.json` | declared dependency groups |
//! | [`LockfileScanner`] | `package-lock.json` | resolved tree, both historical layouts |
//!
//! # Example
//!
//! ```no_run
//! use depsweep::checker::VulnerabilityIndex;
//! use depsweep::scanner::{find_manifest_files, scan_files};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let index = VulnerabilityIndex::load(Path::new("vulnerable.csv"))?;
//!     let files = find_manifest_files(Path::new("."));
//!     let findings = scan_files(&files, &index);
//!     println!("{} findings", findings.len());
//!     Ok(())
//! }
//! ```

mod lockfile;
mod manifest;

pub use lockfile::LockfileScanner;
pub use manifest::FlatManifestScanner;

use crate::checker::VulnerabilityIndex;
use crate::model::{Finding, ManifestKind};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Trait for extracting findings from one kind of manifest file.
///
/// Implementations are lenient by contract: a file that cannot be read or
/// parsed contributes zero findings and never an error, so a single broken
/// manifest cannot abort a scan.
pub trait ManifestScanner: Send + Sync {
    /// Returns the human-readable name of this scanner.
    fn name(&self) -> &'static str;

    /// Returns the manifest kind this scanner handles.
    fn kind(&self) -> ManifestKind;

    /// Extracts findings for every indexed package declared in the file.
    fn scan(&self, path: &Path, index: &VulnerabilityIndex) -> Vec<Finding>;
}

/// Returns the scanner for a manifest kind.
pub fn scanner_for(kind: ManifestKind) -> Box<dyn ManifestScanner> {
    match kind {
        ManifestKind::Manifest => Box::new(FlatManifestScanner),
        ManifestKind::Lockfile => Box::new(LockfileScanner),
    }
}

/// Recursively collects every recognized manifest file under `root`.
///
/// The walk descends into every subdirectory, `node_modules` included;
/// installed packages live inside dependency caches, so nothing is
/// excluded. Symlinks are not followed, which also rules out symlink
/// cycles. Permission errors are skipped silently; any other traversal
/// error is logged and the walk continues.
pub fn find_manifest_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let permission_denied = err
                    .io_error()
                    .is_some_and(|io| io.kind() == ErrorKind::PermissionDenied);
                if !permission_denied {
                    warn!("Error reading {}: {}", describe_walk_error(&err), err);
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if ManifestKind::from_file_name(&name).is_some() {
            files.push(entry.into_path());
        }
    }

    files
}

/// Runs the matching scanner over each discovered file and concatenates
/// the findings. Files whose name is not a recognized manifest are
/// skipped.
pub fn scan_files(files: &[PathBuf], index: &VulnerabilityIndex) -> Vec<Finding> {
    let mut findings = Vec::new();

    for path in files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            continue;
        };
        let Some(kind) = ManifestKind::from_file_name(&name) else {
            continue;
        };

        let scanner = scanner_for(kind);
        let file_findings = scanner.scan(path, index);
        debug!(
            "{}: {} finding(s) in {}",
            scanner.name(),
            file_findings.len(),
            path.display()
        );
        findings.extend(file_findings);
    }

    findings
}

fn describe_walk_error(err: &walkdir::Error) -> String {
    err.path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "directory".to_string())
}
