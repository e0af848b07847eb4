// SPDX-License-Identifier: MIT OR Apache-2.0
//! Key normalization for the truth layer.

/// Normalize a key to a stable lowercase snake_case-ish token.
///
/// Lowercases, collapses every run of non-alphanumeric characters to a
/// single `_`, and strips surrounding underscores. Empty input stays empty.
///
/// # Examples
///
/// ```
/// assert_eq!(mp_core::normalize_key("  Location / City "), "location_city");
/// assert_eq!(mp_core::normalize_key("Tone"), "tone");
/// assert_eq!(mp_core::normalize_key("__"), "");
/// ```
#[must_use]
pub fn normalize_key(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Canonical key identity used when matching stored facts and preferences.
#[must_use]
pub fn key_ident(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_and_strips_edges() {
        assert_eq!(normalize_key("a--b__c"), "a_b_c");
        assert_eq!(normalize_key("...role..."), "role");
        assert_eq!(normalize_key("favorite color!"), "favorite_color");
    }

    #[test]
    fn lowercases() {
        assert_eq!(normalize_key("LocationCity"), "locationcity");
    }

    #[test]
    fn non_ascii_becomes_separator() {
        assert_eq!(normalize_key("café_au_lait"), "caf_au_lait");
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("!!!"), "");
    }
}
