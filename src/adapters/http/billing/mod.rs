//! HTTP adapter for billing endpoints.
//!
//! Exposes the billing domain via REST API:
//! - `POST /api/billing/initiate` - Start a plan checkout against the gateway
//! - `GET /api/billing/plans` - The plan catalog with prices
//! - `POST /api/webhooks/paytr` - Handle gateway payment notifications
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::app_router;
