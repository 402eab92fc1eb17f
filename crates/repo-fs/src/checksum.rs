//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used
//! throughout the workspace as the content address of tracked objects.

use crate::{Error, NormalizedPath, Result};
use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of raw bytes.
pub fn compute_bytes_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Location of an object inside a cache directory: `<hex[..2]>/<hex[2..]>`.
///
/// # Errors
///
/// Returns [`Error::InvalidChecksum`] unless `checksum` is `sha256:` followed
/// by 64 lowercase hex digits.
pub fn object_path(cache_root: &NormalizedPath, checksum: &str) -> Result<NormalizedPath> {
    let hex = checksum
        .strip_prefix(PREFIX)
        .filter(|hex| hex.len() == 64 && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')))
        .ok_or_else(|| Error::InvalidChecksum {
            checksum: checksum.to_string(),
        })?;
    Ok(cache_root.join(&hex[..2]).join(&hex[2..]))
}
