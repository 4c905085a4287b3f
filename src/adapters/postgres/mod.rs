//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresPaymentRepository` - Payment aggregate storage
//! - `PostgresWebhookEventRepository` - Processed-notification ledger
//! - `PostgresSubscriptionRepository` - Subscription transitions

mod payment_repository;
mod subscription_repository;
mod webhook_event_repository;

pub use payment_repository::PostgresPaymentRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
