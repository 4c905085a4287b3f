//! Billing domain module.
//!
//! Handles payment lifecycle, plan pricing, webhook verification, and
//! subscription periods.
//!
//! # Module Structure
//!
//! - `payment` - Payment aggregate entity
//! - `status` - PaymentStatus state machine
//! - `plan` - PlanType and BillingCycle enums
//! - `pricing` - Plan price table and lookup
//! - `money` - Kurus-denominated amounts and decimal conversion
//! - `subscription` - Subscription entity and period arithmetic
//! - `webhook` - Gateway notification payload
//! - `webhook_verifier` - HMAC signature computation and verification
//! - `errors` - Billing error taxonomy

mod errors;
mod money;
mod payment;
mod plan;
mod pricing;
mod status;
mod subscription;
mod webhook;
mod webhook_errors;
mod webhook_verifier;

pub use errors::BillingError;
pub use money::{to_kurus, Money};
pub use payment::Payment;
pub use plan::{BillingCycle, PlanType};
pub use pricing::{plan_price, plan_price_for};
pub use status::PaymentStatus;
pub use subscription::Subscription;
pub use webhook::PaytrNotification;
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{PaytrSignatureVerifier, TokenSignatureInput};
