//! Cache-aside access layer over Redis
//!
//! Callers ask for a value by key and supply a fallback loader; the service
//! answers from the store when it can and otherwise loads, stores with a TTL
//! and returns. The shared store connection is created lazily and replaced
//! when its health check fails.

pub mod api;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheService;
pub use config::{Backend, Config};
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
