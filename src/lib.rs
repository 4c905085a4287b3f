//! Ravenkart Payments - PayTR payment and subscription service
//!
//! This crate handles paid-plan purchases for Ravenkart digital business
//! cards: payment initiation against the PayTR gateway, webhook settlement
//! with signature verification and idempotent processing, and subscription
//! period management.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
