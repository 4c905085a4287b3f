//! PayTR webhook notification model.
//!
//! The gateway posts a form-encoded notification after every payment
//! attempt and keeps redelivering it until it receives a literal `OK`
//! body with HTTP 200.

use serde::{Deserialize, Serialize};

/// A parsed PayTR payment notification.
///
/// Field names match the gateway's form keys. `total_amount` stays a
/// string: it participates in the signature byte-for-byte as received,
/// so it must never be normalized before verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaytrNotification {
    /// Merchant order identifier echoed back from initiation.
    pub merchant_oid: String,

    /// Outcome flag: "1" is success, anything else is failure.
    pub status: String,

    /// Charged amount in kurus, as a decimal string.
    pub total_amount: String,

    /// Base64 HMAC-SHA256 signature over the notification.
    pub hash: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason_msg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<String>,
}

impl PaytrNotification {
    /// Derives the idempotency key for this notification.
    ///
    /// The key is `{merchant_oid}-{status}-{total_amount}` with a literal
    /// `-` delimiter. It is deliberately narrower than the full payload:
    /// two deliveries that differ only in audit fields (failure reason,
    /// payment type) still count as the same event. A notification for
    /// the same order with a different status or amount is a new event.
    pub fn event_id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.merchant_oid, self.status, self.total_amount
        )
    }

    /// Returns true if the gateway reports the charge succeeded.
    pub fn is_success(&self) -> bool {
        self.status == "1"
    }

    /// Serializes the full notification for ledger and audit storage.
    pub fn payload_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Null)
    }
}
