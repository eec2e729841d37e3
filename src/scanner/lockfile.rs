use crate::checker::VulnerabilityIndex;
use crate::model::{Finding, ManifestKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Path segment that marks an installation directory inside a lockfile
/// `packages` key.
const INSTALL_DIR_MARKER: &str = "node_modules/";

/// Scanner for the resolved `package-lock.json` format.
///
/// A lockfile may carry its resolved tree in either or both of two
/// historical layouts: a flat `packages` map keyed by install path
/// (lockfile v2/v3) and a nested `dependencies` tree (lockfile v1). Both
/// are checked unconditionally; the declared `lockfileVersion` is never
/// consulted. When both layouts describe the same data the duplicate
/// findings collapse during aggregation.
pub struct LockfileScanner;

#[derive(Deserialize, Default)]
struct Lockfile {
    #[serde(default)]
    packages: HashMap<String, ResolvedEntry>,
    #[serde(default)]
    dependencies: HashMap<String, DependencyNode>,
}

#[derive(Deserialize)]
struct ResolvedEntry {
    version: Option<String>,
}

#[derive(Deserialize)]
struct DependencyNode {
    version: Option<String>,
    #[serde(default)]
    dependencies: HashMap<String, DependencyNode>,
}

impl super::ManifestScanner for LockfileScanner {
    fn name(&self) -> &'static str {
        "Lockfile"
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::Lockfile
    }

    fn scan(&self, path: &Path, index: &VulnerabilityIndex) -> Vec<Finding> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        let lockfile: Lockfile = match serde_json::from_str(&content) {
            Ok(lockfile) => lockfile,
            Err(_) => return Vec::new(),
        };

        let mut findings = Vec::new();
        check_flat_packages(&lockfile.packages, index, path, &mut findings);
        check_dependency_tree(&lockfile.dependencies, index, path, &mut findings);
        findings
    }
}

/// Checks the flat `packages` layout, keyed by install path.
fn check_flat_packages(
    packages: &HashMap<String, ResolvedEntry>,
    index: &VulnerabilityIndex,
    file: &Path,
    findings: &mut Vec<Finding>,
) {
    for (install_path, entry) in packages {
        // The empty key is the project root itself
        if install_path.is_empty() {
            continue;
        }

        let name = package_name_from_path(install_path);
        let Some(vulnerable) = index.versions(name) else {
            continue;
        };
        let Some(version) = &entry.version else {
            continue;
        };

        // Lockfile versions are already resolved; compare verbatim
        let exact = vulnerable.iter().any(|v| v == version);
        findings.push(Finding::new(name, version, vulnerable.to_vec(), exact, file));
    }
}

/// Checks the nested `dependencies` layout, depth first. Every node is
/// inspected and recursion continues whether or not the node matched.
fn check_dependency_tree(
    dependencies: &HashMap<String, DependencyNode>,
    index: &VulnerabilityIndex,
    file: &Path,
    findings: &mut Vec<Finding>,
) {
    for (name, node) in dependencies {
        if let (Some(vulnerable), Some(version)) = (index.versions(name), &node.version) {
            let exact = vulnerable.iter().any(|v| v == version);
            findings.push(Finding::new(name, version, vulnerable.to_vec(), exact, file));
        }

        check_dependency_tree(&node.dependencies, index, file, findings);
    }
}

/// Derives a package name from a `packages` install path: the segment
/// after the last `node_modules/` marker, or the whole path when the
/// marker is absent. Scoped names (`@scope/name`) survive intact.
fn package_name_from_path(install_path: &str) -> &str {
    match install_path.rfind(INSTALL_DIR_MARKER) {
        Some(pos) => &install_path[pos + INSTALL_DIR_MARKER.len()..],
        None => install_path,
    }
}
