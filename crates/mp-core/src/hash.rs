// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical JSON hashing for provenance records.
//!
//! The canonical encoding is the compact `serde_json` form. Because the
//! default `serde_json::Map` is a `BTreeMap`, object keys are already sorted
//! at every nesting level, so the same logical value hashes identically no
//! matter how it was assembled. Non-ASCII text is preserved verbatim.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 over the canonical JSON encoding of `value`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
///
/// let a = mp_core::sha256_json(&json!({"b": 1, "a": 2}));
/// let b = mp_core::sha256_json(&json!({"a": 2, "b": 1}));
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
#[must_use]
pub fn sha256_json(value: &Value) -> String {
    sha256_hex(value.to_string().as_bytes())
}

/// First 16 hex chars of the canonical hash: the stable-id fallback used by
/// adapters when a record carries no identifier of its own.
#[must_use]
pub fn hash_prefix_id(value: &Value) -> String {
    let mut h = sha256_json(value);
    h.truncate(16);
    h
}

/// Short provenance token: a kind letter followed by a small decimal derived
/// from the canonical hash.
///
/// Not collision-free at scale; [`crate::Passport::upsert_source`] callers
/// disambiguate by suffixing when two distinct payloads land on one token.
#[must_use]
pub fn short_source_id(kind_letter: char, payload: &Value) -> String {
    let digest = Sha256::digest(payload.to_string().as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    format!("{kind_letter}{}", u64::from_be_bytes(word) % 10_000_000)
}
