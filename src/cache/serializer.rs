//! Serializer
//!
//! JSON transport encoding for cached values. Blank text means "absent".

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

/// Encodes a value for the store. An absent value encodes to empty text.
pub fn serialize<T: Serialize>(value: Option<&T>) -> Result<String> {
    match value {
        Some(value) => serde_json::to_string(value).map_err(CacheError::Encode),
        None => Ok(String::new()),
    }
}

/// Decodes stored text. Empty or whitespace-only text decodes to `None`.
///
/// Non-blank text that is not a valid encoding of `T` is a
/// `CacheError::Decode`, never a miss.
pub fn deserialize<T: DeserializeOwned>(text: &str) -> Result<Option<T>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(CacheError::Decode)
}
