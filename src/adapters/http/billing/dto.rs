//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the wire structure for the billing API. JSON bodies
//! use camelCase per the storefront contract; the webhook form keeps the
//! gateway's snake_case form keys.

use serde::{Deserialize, Serialize};

use crate::domain::billing::{PaytrNotification, WebhookError};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to initiate a plan checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    /// Plan identifier (`personal`, `professional`, `enterprise`).
    pub plan_type: String,
    /// Billing cycle (`monthly`, `yearly`).
    pub billing_cycle: String,
    /// Buyer email, forwarded to the gateway.
    pub user_email: String,
    /// Buyer display name, forwarded to the gateway.
    pub user_name: String,
    /// Optional buyer phone.
    #[serde(default)]
    pub user_phone: Option<String>,
}

/// Raw form fields of a gateway payment notification.
///
/// Every field is optional at this layer so missing-field rejection is
/// ours (HTTP 400) rather than a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct PaytrWebhookForm {
    pub merchant_oid: Option<String>,
    pub status: Option<String>,
    pub total_amount: Option<String>,
    pub hash: Option<String>,
    pub failed_reason_code: Option<String>,
    pub failed_reason_msg: Option<String>,
    pub test_mode: Option<String>,
    pub payment_type: Option<String>,
    pub currency: Option<String>,
    pub payment_amount: Option<String>,
}

impl PaytrWebhookForm {
    /// Validates required fields and builds the domain notification.
    ///
    /// Rejection happens before any hash computation or side effect; a
    /// blank value counts as missing because it could never have been
    /// part of the signed material.
    pub fn into_notification(self) -> Result<PaytrNotification, WebhookError> {
        Ok(PaytrNotification {
            merchant_oid: require(self.merchant_oid, "merchant_oid")?,
            status: require(self.status, "status")?,
            total_amount: require(self.total_amount, "total_amount")?,
            hash: require(self.hash, "hash")?,
            failed_reason_code: self.failed_reason_code,
            failed_reason_msg: self.failed_reason_msg,
            test_mode: self.test_mode,
            payment_type: self.payment_type,
            currency: self.currency,
            payment_amount: self.payment_amount,
        })
    }
}

fn require(value: Option<String>, field: &'static str) -> Result<String, WebhookError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(WebhookError::MissingField(field))
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for successful checkout initiation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentResponse {
    /// Single-use token the storefront embeds in the gateway iframe.
    pub payment_token: String,
    /// Hosted checkout iframe URL.
    pub iframe_url: String,
    /// Merchant order identifier of the pending payment.
    pub order_id: String,
    /// Charged amount as a two-decimal major-unit string.
    pub amount: String,
}

/// One row of the plan catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCatalogEntry {
    /// Plan identifier.
    pub plan_type: String,
    /// Human-readable plan name.
    pub display_name: String,
    /// Billing cycle.
    pub billing_cycle: String,
    /// Price as a two-decimal major-unit string.
    pub price: String,
    /// Currency code.
    pub currency: String,
}

/// Response for the plan catalog.
#[derive(Debug, Clone, Serialize)]
pub struct PlanCatalogResponse {
    pub plans: Vec<PlanCatalogEntry>,
}

/// Response for the liveness probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}
