//! Records and response bodies for the demo API
//!
//! The employee records are the values cached by the service; the response
//! DTOs shape the admin and health endpoints.

pub mod employee;
pub mod responses;

// Re-export commonly used types
pub use employee::{Employee, Person};
pub use responses::{ErrorResponse, FlushResponse, HealthResponse, StatsResponse};
