//! Content fingerprinting for deduplication.
//!
//! A fingerprint is a deterministic rolling hash over normalized text:
//! lowercased, punctuation stripped, whitespace collapsed. Two submissions
//! of the same content in different casing or punctuation always map to the
//! same fingerprint. Collisions are accepted; this is a dedup key, not a
//! cryptographic digest.

use recall_core::types::{ContentItem, Fingerprint};

/// Lowercase, strip punctuation, and collapse whitespace.
///
/// Every run of non-alphanumeric characters becomes a single space, so
/// `"Hello, World!"` normalizes to `"hello world"`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_space = true;
        }
    }

    out
}

/// Compute the dedup fingerprint of a piece of raw text.
pub fn fingerprint(text: &str) -> Fingerprint {
    let normalized = normalize(text);

    // Polynomial rolling hash over the normalized bytes.
    let mut hash: u64 = 0;
    for byte in normalized.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as u64);
    }

    Fingerprint(format!("{:016x}", hash))
}

/// Linear lookup of an item by exact fingerprint match.
pub fn find_existing<'a>(items: &'a [ContentItem], fp: &Fingerprint) -> Option<&'a ContentItem> {
    items.iter().find(|item| &item.fingerprint == fp)
}
