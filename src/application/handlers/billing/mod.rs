//! Billing handlers.
//!
//! Command handlers for the payment lifecycle:
//!
//! ## Commands
//! - Initiating a checkout against the gateway
//! - Processing gateway payment webhooks

mod handle_payment_webhook;
mod initiate_payment;

pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use initiate_payment::{
    CheckoutSettings, InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult,
};
