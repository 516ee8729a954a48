//! API Module
//!
//! HTTP handlers and routing for the demo employee service.
//!
//! # Endpoints
//! - `GET /employees` - All employees, through the cache
//! - `GET /employees/:id` - One employee, through the cache
//! - `POST /admin/flush` - Flush every store endpoint
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
