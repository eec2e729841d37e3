mod index;
mod version;

pub use index::VulnerabilityIndex;
pub use version::{is_vulnerable_version, normalize_specifier};
