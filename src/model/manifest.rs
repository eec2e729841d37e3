use serde::{Deserialize, Serialize};

/// The flat dependency declaration file name.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// The resolved dependency tree (lockfile) file name.
pub const LOCKFILE_FILE_NAME: &str = "package-lock.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Manifest,
    Lockfile,
}

impl ManifestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::Manifest => "manifest",
            ManifestKind::Lockfile => "lockfile",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ManifestKind::Manifest => MANIFEST_FILE_NAME,
            ManifestKind::Lockfile => LOCKFILE_FILE_NAME,
        }
    }

    /// Classifies a base file name as one of the recognized manifest kinds.
    ///
    /// The match is on the exact file name, not a suffix: `my-package.json`
    /// is not a manifest.
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            MANIFEST_FILE_NAME => Some(ManifestKind::Manifest),
            LOCKFILE_FILE_NAME => Some(ManifestKind::Lockfile),
            _ => None,
        }
    }
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
