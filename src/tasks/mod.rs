//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the service is up.
//!
//! # Tasks
//! - Expiry sweep: drops expired entries from the in-process store

mod sweeper;

pub use sweeper::spawn_sweep_task;
