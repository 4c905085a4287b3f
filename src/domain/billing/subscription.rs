//! Subscription entity granting plan access for a billing period.

use serde::{Deserialize, Serialize};

use crate::domain::billing::plan::{BillingCycle, PlanType};
use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp, UserId,
};

/// A user's entitlement to a plan for one billing period.
///
/// # Invariants
///
/// - At most one active subscription per user (enforced at the
///   persistence layer by a transactional deactivate-then-insert)
/// - `ends_at` is derived from `starts_at` and the billing cycle via
///   calendar arithmetic, never wall-clock offsets
/// - Superseded subscriptions are deactivated, never deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for this subscription.
    pub id: SubscriptionId,

    /// User who holds this subscription.
    pub user_id: UserId,

    /// Plan granted for the period.
    pub plan: PlanType,

    /// Cycle the period was purchased on.
    pub billing_cycle: BillingCycle,

    /// Completed payment that created this subscription.
    pub payment_id: PaymentId,

    /// When the entitlement period begins.
    pub starts_at: Timestamp,

    /// When the entitlement period ends.
    pub ends_at: Timestamp,

    /// Whether this is the user's current subscription.
    pub active: bool,

    /// When the row was created.
    pub created_at: Timestamp,
}

impl Subscription {
    /// Starts a new active subscription beginning at `starts_at`.
    ///
    /// The period end is one calendar month or year later, clamped to
    /// the last day of the target month (Jan 31 monthly ends Feb 28).
    ///
    /// # Errors
    ///
    /// Returns error if the period end would leave the representable
    /// date range.
    pub fn start(
        user_id: UserId,
        plan: PlanType,
        billing_cycle: BillingCycle,
        payment_id: PaymentId,
        starts_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let ends_at = billing_cycle.period_end(starts_at).ok_or_else(|| {
            DomainError::new(
                ErrorCode::OutOfRange,
                "Subscription period end is out of the representable date range",
            )
        })?;

        Ok(Self {
            id: SubscriptionId::new(),
            user_id,
            plan,
            billing_cycle,
            payment_id,
            starts_at,
            ends_at,
            active: true,
            created_at: Timestamp::now(),
        })
    }

    /// Marks this subscription as superseded.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Whether the period covers the given moment.
    ///
    /// The end bound is exclusive so a renewal starting exactly at
    /// `ends_at` never overlaps its predecessor.
    pub fn covers(&self, at: &Timestamp) -> bool {
        self.active && !at.is_before(&self.starts_at) && at.is_before(&self.ends_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    fn subscription(cycle: BillingCycle, starts_at: Timestamp) -> Subscription {
        Subscription::start(
            UserId::new("user-123").unwrap(),
            PlanType::Professional,
            cycle,
            PaymentId::new(),
            starts_at,
        )
        .unwrap()
    }

    #[test]
    fn test_monthly_subscription_ends_one_calendar_month_later() {
        let sub = subscription(BillingCycle::Monthly, ts(2025, 3, 15));
        assert_eq!(sub.ends_at, ts(2025, 4, 15));
        assert!(sub.active);
    }

    #[test]
    fn test_yearly_subscription_ends_one_calendar_year_later() {
        let sub = subscription(BillingCycle::Yearly, ts(2025, 3, 15));
        assert_eq!(sub.ends_at, ts(2026, 3, 15));
    }

    #[test]
    fn test_month_end_clamps_to_shorter_month() {
        let sub = subscription(BillingCycle::Monthly, ts(2025, 1, 31));
        assert_eq!(sub.ends_at, ts(2025, 2, 28));
    }

    #[test]
    fn test_yearly_from_leap_day_clamps() {
        let sub = subscription(BillingCycle::Yearly, ts(2024, 2, 29));
        assert_eq!(sub.ends_at, ts(2025, 2, 28));
    }

    #[test]
    fn test_deactivate_clears_active_flag() {
        let mut sub = subscription(BillingCycle::Monthly, ts(2025, 3, 15));
        sub.deactivate();
        assert!(!sub.active);
    }

    #[test]
    fn test_covers_is_half_open() {
        let sub = subscription(BillingCycle::Monthly, ts(2025, 3, 15));
        assert!(sub.covers(&ts(2025, 3, 15)));
        assert!(sub.covers(&ts(2025, 4, 14)));
        assert!(!sub.covers(&ts(2025, 4, 15)));
        assert!(!sub.covers(&ts(2025, 3, 14)));
    }

    #[test]
    fn test_deactivated_subscription_covers_nothing() {
        let mut sub = subscription(BillingCycle::Monthly, ts(2025, 3, 15));
        sub.deactivate();
        assert!(!sub.covers(&ts(2025, 3, 20)));
    }
}
