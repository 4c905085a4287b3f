//! Subscription repository port (write side).
//!
//! Defines the contract for the subscription transition that follows a
//! completed payment.
//!
//! # Design
//!
//! - **Single transition operation**: deactivate-then-insert is one port
//!   method so atomicity is an implementation guarantee, not a caller
//!   obligation
//! - **At most one active subscription per user**: the invariant the
//!   transition exists to preserve
//! - **Deactivate, never delete**: superseded rows stay for history

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

/// Repository port for subscription persistence.
///
/// Implementations must run `replace_active` as one database transaction:
/// a crash between deactivation and insertion must not be observable.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Atomically supersede the user's active subscription with this one.
    ///
    /// Deactivates every active row for `subscription.user_id`, then
    /// inserts `subscription` as the new active row, in one transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (the transaction rolls
    ///   back; the previous active subscription survives)
    async fn replace_active(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Find the user's current active subscription.
    ///
    /// Returns `None` if the user has never purchased, or only holds
    /// deactivated rows.
    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError>;
}
