//! PayTR payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against PayTR's token endpoint,
//! plus a configurable mock for tests and local development.
//!
//! # Security
//!
//! The adapter only transmits requests the domain layer has already
//! signed; the merchant key and salt never reach this module.

mod mock_gateway;
mod paytr_adapter;

pub use mock_gateway::MockPaytrGateway;
pub use paytr_adapter::{PaytrGatewayAdapter, PaytrGatewayConfig};
