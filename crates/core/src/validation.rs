//! Input validation utilities.

use crate::store::StoreError;

/// Validates that a collection key is safe to use as a file name.
///
/// Keys become `<key>.json` under the data directory, so they are restricted to
/// a conservative ASCII set with bounded length.
///
/// # Errors
///
/// Returns `StoreError::InvalidKey` if the key is empty, too long, or contains
/// characters other than ASCII alphanumerics, `-` and `_`.
pub fn validate_storage_key(key: &str) -> Result<(), StoreError> {
    const MAX_KEY_LEN: usize = 128;

    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey("key cannot be empty".into()));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::InvalidKey(format!(
            "key exceeds maximum length of {} characters",
            MAX_KEY_LEN
        )));
    }

    let ok = key
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_'));

    if !ok {
        return Err(StoreError::InvalidKey(format!(
            "key '{key}' contains invalid characters (only alphanumeric, '-', '_' allowed)"
        )));
    }

    Ok(())
}
