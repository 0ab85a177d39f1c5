//! Name normalization for case-insensitive uniqueness
//!
//! Groups and traits are identified by their name regardless of letter case.
//! Every store keys its uniqueness index on the normalized form.

/// Normalized form of a group or trait name.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// True when two names are equal under case-insensitive comparison.
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}
