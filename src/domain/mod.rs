//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `billing` - Payment lifecycle, pricing, webhooks, and subscriptions

pub mod billing;
pub mod foundation;
