//! Text folding for search matching and title collation.
//!
//! Folding decomposes to NFD, strips combining marks and lowercases, so
//! "Café" and "cafe" compare equal.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold a string for accent- and case-insensitive comparison.
pub fn fold_for_search(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Whether `haystack` contains an already-folded `folded_query`.
///
/// An empty query matches everything.
pub fn matches_folded(haystack: &str, folded_query: &str) -> bool {
    folded_query.is_empty() || fold_for_search(haystack).contains(folded_query)
}

/// Sort key for alphabetical title ordering.
///
/// Compared in three tiers: base letters first ("Árbol" < "banana" < "Zapato"),
/// then accents ("Mesa" < "Mésa"), then case with lowercase first
/// ("mesa" < "Mesa"). Titles equal on every tier keep their relative order
/// under a stable sort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    base: String,
    accents: String,
    uppercase: Vec<bool>,
}

/// Build the [`CollationKey`] for a title.
pub fn collation_key(s: &str) -> CollationKey {
    CollationKey {
        base: fold_for_search(s),
        accents: s.nfc().collect::<String>().to_lowercase(),
        uppercase: s.nfc().map(char::is_uppercase).collect(),
    }
}
