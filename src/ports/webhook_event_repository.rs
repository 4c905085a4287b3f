//! WebhookEventRepository port - Interface for the processed-notification ledger.
//!
//! This port enables idempotent webhook handling by recording every
//! notification the gateway has delivered. The stored payload doubles as an
//! audit trail for support and reconciliation.
//!
//! ## Why Webhook Idempotency Matters
//!
//! PayTR redelivers the same notification until it receives an `OK` body:
//! - Network timeouts
//! - Non-200 response from our endpoint (triggers retry)
//! - Our endpoint returning success but the gateway not receiving it
//!
//! All webhook handlers MUST be idempotent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::billing::PaytrNotification;
use crate::domain::foundation::DomainError;

/// Ledger row for one processed gateway notification.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Deduplication key: `{merchant_oid}-{status}-{total_amount}`.
    pub event_id: String,

    /// Merchant order identifier from the notification.
    pub merchant_oid: String,

    /// Gateway status code ("1" is success).
    pub status: String,

    /// Charged amount in kurus, as delivered.
    pub total_amount: String,

    /// When the event was first processed.
    pub processed_at: DateTime<Utc>,

    /// Full notification payload for auditing.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    /// Builds the ledger row for a verified notification.
    pub fn from_notification(notification: &PaytrNotification) -> Self {
        Self {
            event_id: notification.event_id(),
            merchant_oid: notification.merchant_oid.clone(),
            status: notification.status.clone(),
            total_amount: notification.total_amount.clone(),
            processed_at: Utc::now(),
            payload: notification.payload_json(),
        }
    }
}

/// Result of attempting to append a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Row was inserted (first sighting of this event).
    Inserted,
    /// Row already exists (duplicate delivery).
    AlreadyExists,
}

/// Port for the append-only webhook event ledger.
///
/// Implementations must enforce uniqueness with a database constraint
/// (PRIMARY KEY on event_id), never check-then-insert: two concurrent
/// deliveries of the same event must not both observe `Inserted`.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Find a previously recorded event by its deduplication key.
    ///
    /// Returns `None` if the event has not been seen yet.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Attempt to append a ledger row.
    ///
    /// Uses `ON CONFLICT DO NOTHING` semantics. Returns
    /// `SaveResult::Inserted` on first sighting, `SaveResult::AlreadyExists`
    /// when another delivery already claimed the key.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;
}
