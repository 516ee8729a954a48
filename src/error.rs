//! Error types for the cache-aside layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Every variant is terminal to the call that raised it. A cache miss is
/// not an error and never surfaces here.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or whitespace-only
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// TTL is not a positive, finite duration
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Store unreachable, address malformed, or connection dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// Store accepted the connection but rejected a command
    #[error("Store error: {0}")]
    Store(String),

    /// Command needs a connection opened in admin mode
    #[error("Admin connection required for {0}")]
    AdminRequired(&'static str),

    /// Value could not be encoded for transport
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored text is not a valid encoding of the requested type
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Fallback computation failed
    #[error("Loader failed: {0}")]
    Loader(#[source] anyhow::Error),
}

// == Redis Error Conversion ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            CacheError::Connection(err.to_string())
        } else {
            CacheError::Store(err.to_string())
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_) | CacheError::InvalidTtl(_) => StatusCode::BAD_REQUEST,
            CacheError::AdminRequired(_) => StatusCode::FORBIDDEN,
            CacheError::Connection(_) | CacheError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Loader(_) => StatusCode::BAD_GATEWAY,
            CacheError::Encode(_) | CacheError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
