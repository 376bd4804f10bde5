//! API Module
//!
//! HTTP handlers and routing for the cachew REST API.
//!
//! # Endpoints
//! - `PUT /set`, `GET /get/:key`, `DELETE /del/:key` - TTL cache access
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint
//! - `/index/...` - Range index writes and queries

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
