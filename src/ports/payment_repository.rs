//! Payment repository port (write side).
//!
//! Defines the contract for persisting and retrieving Payment aggregates.
//! Implementations handle the actual database operations.
//!
//! # Design
//!
//! - **Order-id keyed**: the merchant order id is the external lookup key;
//!   the webhook only ever carries that identifier
//! - **Unique constraint**: one payment per order id, enforced by the
//!   datastore
//! - **Accumulating payload**: gateway notifications merge into the stored
//!   response JSON, they never overwrite it
//!
//! # Example
//!
//! ```ignore
//! async fn settle(
//!     repo: &dyn PaymentRepository,
//!     order_id: &OrderId,
//!     payload: serde_json::Value,
//! ) -> Result<(), DomainError> {
//!     let mut payment = repo
//!         .find_by_order_id(order_id)
//!         .await?
//!         .ok_or_else(|| DomainError::new(ErrorCode::PaymentNotFound, "Unknown order"))?;
//!
//!     payment.complete(Timestamp::now())?;
//!     repo.record_outcome(&payment, &payload).await
//! }
//! ```

use crate::domain::billing::Payment;
use crate::domain::foundation::{DomainError, OrderId};
use async_trait::async_trait;

/// Repository port for Payment aggregate persistence.
///
/// Implementations must ensure:
/// - Unique order_id constraint at the datastore level
/// - Outcome updates touch exactly one row
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new pending payment created at initiation.
    ///
    /// # Errors
    ///
    /// - `PaymentExists` if the order id is already taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Find a payment by its merchant order id.
    ///
    /// Returns `None` if no payment was initiated under that id.
    /// This is the primary lookup method since the webhook identifies
    /// payments only by order id.
    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError>;

    /// Persist a settled payment's status and merge the gateway payload.
    ///
    /// Writes the payment's current status and completion timestamp, and
    /// concatenates `gateway_payload` onto the stored response JSON.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if no row matches the payment id
    /// - `DatabaseError` on persistence failure
    async fn record_outcome(
        &self,
        payment: &Payment,
        gateway_payload: &serde_json::Value,
    ) -> Result<(), DomainError>;
}
