//! Version specifier normalization and exact-match comparison.
//!
//! Comparison is deliberately string-exact: a specifier like `^1.2.0` has
//! its single leading range operator stripped and is then compared
//! verbatim against the index, with no semver range resolution.

/// Characters a flat manifest may prefix a version specifier with.
const RANGE_OPERATORS: [char; 5] = ['^', '~', '>', '=', '<'];

/// Strips at most one leading range-operator character, then trims
/// surrounding whitespace.
///
/// Idempotent on already-normalized strings. Note that `>=1.2.3` becomes
/// `=1.2.3`: only a single character is ever stripped.
pub fn normalize_specifier(spec: &str) -> &str {
    spec.strip_prefix(RANGE_OPERATORS).unwrap_or(spec).trim()
}

/// True iff the normalized specifier equals one of the listed vulnerable
/// versions.
pub fn is_vulnerable_version(spec: &str, vulnerable_versions: &[String]) -> bool {
    let normalized = normalize_specifier(spec);
    vulnerable_versions.iter().any(|v| v == normalized)
}
