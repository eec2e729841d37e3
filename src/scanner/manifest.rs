use crate::checker::{is_vulnerable_version, VulnerabilityIndex};
use crate::model::{Finding, ManifestKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Scanner for the flat `package.json` declaration format.
pub struct FlatManifestScanner;

#[derive(Deserialize, Default)]
struct FlatManifest {
    #[serde(default)]
    dependencies: HashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: HashMap<String, String>,
    #[serde(default, rename = "peerDependencies")]
    peer_dependencies: HashMap<String, String>,
    #[serde(default, rename = "optionalDependencies")]
    optional_dependencies: HashMap<String, String>,
}

impl FlatManifest {
    /// Merges the four dependency groups into one map. Later groups win on
    /// name collision: dependencies < devDependencies < peerDependencies <
    /// optionalDependencies.
    fn merged_dependencies(self) -> HashMap<String, String> {
        let mut merged = self.dependencies;
        merged.extend(self.dev_dependencies);
        merged.extend(self.peer_dependencies);
        merged.extend(self.optional_dependencies);
        merged
    }
}

impl super::ManifestScanner for FlatManifestScanner {
    fn name(&self) -> &'static str {
        "Flat manifest"
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::Manifest
    }

    fn scan(&self, path: &Path, index: &VulnerabilityIndex) -> Vec<Finding> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        let manifest: FlatManifest = match serde_json::from_str(&content) {
            Ok(manifest) => manifest,
            Err(_) => return Vec::new(),
        };

        let mut findings = Vec::new();

        for (name, specifier) in manifest.merged_dependencies() {
            let Some(vulnerable) = index.versions(&name) else {
                continue;
            };

            // Normalization decides the match; the finding keeps the raw
            // specifier for display.
            let exact = is_vulnerable_version(&specifier, vulnerable);
            findings.push(Finding::new(
                name,
                specifier,
                vulnerable.to_vec(),
                exact,
                path,
            ));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ManifestScanner as _;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_manifest(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn index() -> VulnerabilityIndex {
        VulnerabilityIndex::from_entries(&[("left-pad", &["1.0.1"])])
    }

    #[test]
    fn test_range_prefixed_specifier_is_exact_match() {
        let file = write_manifest(r#"{"dependencies": {"left-pad": "^1.0.1"}}"#);
        let findings = FlatManifestScanner.scan(file.path(), &index());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].package, "left-pad");
        assert_eq!(findings[0].installed_version, "^1.0.1");
        assert!(findings[0].exact_match);
    }

    #[test]
    fn test_other_version_is_different_version_match() {
        let file = write_manifest(r#"{"dependencies": {"left-pad": "1.0.2"}}"#);
        let findings = FlatManifestScanner.scan(file.path(), &index());

        assert_eq!(findings.len(), 1);
        assert!(!findings[0].exact_match);
        assert_eq!(findings[0].vulnerable_versions, vec!["1.0.1".to_string()]);
    }

    #[test]
    fn test_unindexed_packages_are_skipped() {
        let file = write_manifest(
            r#"{"dependencies": {"lodash": "4.17.21", "left-pad": "1.0.1"}}"#,
        );
        let findings = FlatManifestScanner.scan(file.path(), &index());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].package, "left-pad");
    }

    #[test]
    fn test_all_four_dependency_groups_are_checked() {
        let file = write_manifest(
            r#"{
                "dependencies": {"a": "1.0.0"},
                "devDependencies": {"b": "1.0.0"},
                "peerDependencies": {"c": "1.0.0"},
                "optionalDependencies": {"d": "1.0.0"}
            }"#,
        );
        let index = VulnerabilityIndex::from_entries(&[
            ("a", &["1.0.0"]),
            ("b", &["1.0.0"]),
            ("c", &["1.0.0"]),
            ("d", &["1.0.0"]),
        ]);

        let mut findings = FlatManifestScanner.scan(file.path(), &index);
        findings.sort_by(|x, y| x.package.cmp(&y.package));

        assert_eq!(findings.len(), 4);
    }

    #[test]
    fn test_later_group_overrides_earlier_on_collision() {
        let file = write_manifest(
            r#"{
                "dependencies": {"left-pad": "^1.0.1"},
                "optionalDependencies": {"left-pad": "2.0.0"}
            }"#,
        );
        let findings = FlatManifestScanner.scan(file.path(), &index());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].installed_version, "2.0.0");
        assert!(!findings[0].exact_match);
    }

    #[test]
    fn test_malformed_json_yields_no_findings() {
        let file = write_manifest("{ not json");
        assert!(FlatManifestScanner.scan(file.path(), &index()).is_empty());
    }

    #[test]
    fn test_missing_file_yields_no_findings() {
        let findings = FlatManifestScanner.scan(Path::new("/nonexistent/package.json"), &index());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_manifest_without_dependency_groups() {
        let file = write_manifest(r#"{"name": "my-app", "version": "0.1.0"}"#);
        assert!(FlatManifestScanner.scan(file.path(), &index()).is_empty());
    }
}
