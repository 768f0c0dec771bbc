//! Player identity normalization.
//!
//! Display names are what players typed; the normalized form is the stable
//! key every map in the game document is keyed by.

/// Canonicalize a display name into its identity key.
///
/// Trims, lowercases, and collapses internal whitespace runs to single
/// spaces. Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
