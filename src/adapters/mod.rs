//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST API exposing billing operations
//! - `paytr` - PayTR gateway token exchange
//! - `postgres` - PostgreSQL-backed persistence

pub mod http;
pub mod paytr;
pub mod postgres;
