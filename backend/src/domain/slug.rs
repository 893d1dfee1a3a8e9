//! Slug derivation for group names.
//!
//! A slug is the lower-cased name with runs of whitespace collapsed into a
//! single `-`. Two names that differ only in case or spacing share a slug.

/// Derive the slug for `name`.
///
/// # Examples
/// ```
/// use satisfacture::domain::derive_slug;
///
/// assert_eq!(derive_slug("  Grupo   Norte "), "grupo-norte");
/// ```
pub fn derive_slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
