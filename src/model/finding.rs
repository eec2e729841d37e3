use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::PathBuf;

/// One vulnerable-package observation inside one manifest file.
///
/// A finding is only ever built for a package that appears in the
/// vulnerability index; `vulnerable_versions` carries the index's full
/// version list for the package so the report can show what to look for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Dependency name as declared in the manifest.
    pub package: String,
    /// Raw version string exactly as it appears in the manifest. For flat
    /// manifests this may still carry a range-operator prefix.
    pub installed_version: String,
    /// All known-vulnerable versions for this package, in index order.
    pub vulnerable_versions: Vec<String>,
    /// True iff the normalized installed version equals one of
    /// `vulnerable_versions`.
    pub exact_match: bool,
    /// Manifest file that produced this finding.
    pub file: PathBuf,
}

impl Finding {
    pub fn new(
        package: impl Into<String>,
        installed_version: impl Into<String>,
        vulnerable_versions: Vec<String>,
        exact_match: bool,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package: package.into(),
            installed_version: installed_version.into(),
            vulnerable_versions,
            exact_match,
            file: file.into(),
        }
    }

    /// Identity key used for deduplication across redundant lockfile shapes.
    fn dedup_key(&self) -> (PathBuf, String, String) {
        (
            self.file.clone(),
            self.package.clone(),
            self.installed_version.clone(),
        )
    }
}

/// Deduplicated, deterministically ordered results of a whole scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_time: DateTime<Utc>,
    /// Number of manifest files inspected, matched or not.
    pub files_scanned: usize,
    pub findings: Vec<Finding>,
}

impl ScanResult {
    /// Builds a result from raw per-file findings.
    ///
    /// Duplicates on the (file, package, installed version) key collapse to
    /// the first occurrence; a lockfile that lists the same resolved package
    /// under several tree positions legitimately produces such duplicates.
    /// Findings are then sorted by file path, exact matches before
    /// different-version matches within a file, then package name.
    pub fn new(files_scanned: usize, findings: Vec<Finding>) -> Self {
        let mut seen = HashSet::new();
        let mut unique: Vec<Finding> = findings
            .into_iter()
            .filter(|f| seen.insert(f.dedup_key()))
            .collect();

        unique.sort_by(compare_findings);

        Self {
            scan_time: Utc::now(),
            files_scanned,
            findings: unique,
        }
    }

    pub fn exact_matches(&self) -> usize {
        self.findings.iter().filter(|f| f.exact_match).count()
    }

    pub fn different_versions(&self) -> usize {
        self.findings.iter().filter(|f| !f.exact_match).count()
    }

    /// The exit-status predicate: only confirmed vulnerable versions fail a
    /// scan, same-package-different-version findings do not.
    pub fn has_exact_match(&self) -> bool {
        self.findings.iter().any(|f| f.exact_match)
    }
}

fn compare_findings(a: &Finding, b: &Finding) -> Ordering {
    a.file
        .cmp(&b.file)
        .then_with(|| b.exact_match.cmp(&a.exact_match))
        .then_with(|| a.package.cmp(&b.package))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(file: &str, package: &str, version: &str, exact: bool) -> Finding {
        Finding::new(package, version, vec!["1.0.0".to_string()], exact, file)
    }

    #[test]
    fn test_dedup_same_key_collapses() {
        let result = ScanResult::new(
            1,
            vec![
                finding("a/package-lock.json", "evil-pkg", "2.0.0", true),
                finding("a/package-lock.json", "evil-pkg", "2.0.0", true),
            ],
        );

        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn test_dedup_key_includes_version_and_file() {
        let result = ScanResult::new(
            2,
            vec![
                finding("a/package-lock.json", "evil-pkg", "2.0.0", true),
                finding("a/package-lock.json", "evil-pkg", "2.0.1", false),
                finding("b/package-lock.json", "evil-pkg", "2.0.0", true),
            ],
        );

        assert_eq!(result.findings.len(), 3);
    }

    #[test]
    fn test_sort_file_is_primary_key() {
        let result = ScanResult::new(
            2,
            vec![
                finding("b/package.json", "aaa", "1.0.0", true),
                finding("a/package.json", "zzz", "1.0.0", false),
            ],
        );

        assert_eq!(result.findings[0].file, PathBuf::from("a/package.json"));
        assert_eq!(result.findings[1].file, PathBuf::from("b/package.json"));
    }

    #[test]
    fn test_sort_exact_before_different_within_file() {
        let result = ScanResult::new(
            1,
            vec![
                finding("a/package.json", "aaa", "1.0.1", false),
                finding("a/package.json", "zzz", "1.0.0", true),
            ],
        );

        assert!(result.findings[0].exact_match);
        assert_eq!(result.findings[1].package, "aaa");
    }

    #[test]
    fn test_sort_package_is_tertiary_key() {
        let result = ScanResult::new(
            1,
            vec![
                finding("a/package.json", "zeta", "1.0.0", true),
                finding("a/package.json", "alpha", "1.0.0", true),
            ],
        );

        assert_eq!(result.findings[0].package, "alpha");
        assert_eq!(result.findings[1].package, "zeta");
    }

    #[test]
    fn test_counters() {
        let result = ScanResult::new(
            1,
            vec![
                finding("a/package.json", "aaa", "1.0.0", true),
                finding("a/package.json", "bbb", "1.0.1", false),
                finding("a/package.json", "ccc", "1.0.2", false),
            ],
        );

        assert_eq!(result.exact_matches(), 1);
        assert_eq!(result.different_versions(), 2);
        assert!(result.has_exact_match());
    }

    #[test]
    fn test_exit_predicate_ignores_different_versions() {
        let result = ScanResult::new(
            1,
            vec![finding("a/package.json", "aaa", "1.0.1", false)],
        );

        assert!(!result.has_exact_match());
        assert_eq!(result.different_versions(), 1);
    }

    #[test]
    fn test_empty_scan() {
        let result = ScanResult::new(0, Vec::new());

        assert!(result.findings.is_empty());
        assert!(!result.has_exact_match());
    }
}
