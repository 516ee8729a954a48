//! Cache Key
//!
//! Keys are validated once, at the service boundary, before any store I/O.

use std::fmt;

use crate::error::{CacheError, Result};

// == Cache Key ==
/// A key that is neither empty nor whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Validates `key`, failing with `CacheError::InvalidKey`.
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(CacheError::InvalidKey(
                "key cannot be empty or only whitespace".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
