//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PaymentRepository` - Payment aggregate persistence
//! - `SubscriptionRepository` - Atomic subscription transition
//! - `WebhookEventRepository` - Webhook idempotency ledger
//!
//! ## Gateway Ports
//!
//! - `PaymentGateway` - PayTR token exchange

mod payment_gateway;
mod payment_repository;
mod subscription_repository;
mod webhook_event_repository;

pub use payment_gateway::{
    GatewayError, GatewayErrorCode, PaymentGateway, TokenRequest, TokenResponse,
};
pub use payment_repository::PaymentRepository;
pub use subscription_repository::SubscriptionRepository;
pub use webhook_event_repository::{SaveResult, WebhookEventRecord, WebhookEventRepository};
