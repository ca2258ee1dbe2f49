// src/fingerprint.rs
//! Content-identity key for news items.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

const SEPARATOR: &str = "::";

/// SHA-256 over `title::url`, lower-case hex. Pure and stable across runs.
pub fn fingerprint(title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(SEPARATOR.as_bytes());
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
