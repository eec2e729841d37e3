//! Core data types for manifests, findings, and scan results.
//!
//! This module contains the fundamental types used throughout depsweep:
//!
//! - [`ManifestKind`] - Which recognized manifest file a path refers to
//! - [`Finding`] - A vulnerable-package observation in one manifest
//! - [`ScanResult`] - Deduplicated, sorted results of a whole scan
//!
//! # Example
//!
//! ```
//! use depsweep::model::{Finding, ScanResult};
//!
//! let finding = Finding::new("left-pad", "^1.0.1", vec!["1.0.1".into()], true, "package.json");
//! let result = ScanResult::new(1, vec![finding]);
//!
//! assert_eq!(result.exact_matches(), 1);
//! ```

mod finding;
mod manifest;

pub use finding::*;
pub use manifest::*;
