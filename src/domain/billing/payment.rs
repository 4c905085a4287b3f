//! Payment aggregate entity.
//!
//! A Payment records one purchase attempt against the gateway. It is
//! created pending at initiation and settled exactly once by a verified
//! webhook notification.
//!
//! # Design Decisions
//!
//! - **Money in kurus**: All monetary values stored as i64 kurus (not floats)
//! - **Order id as the join key**: The gateway echoes merchant_oid back,
//!   so `order_id` is unique at the database level
//! - **Gateway payloads accumulate**: Webhook payloads merge into
//!   `gateway_response`; earlier entries are never overwritten

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, OrderId, PaymentId, StateMachine, Timestamp, UserId,
};

use super::{BillingCycle, Money, PaymentStatus, PlanType};

/// Payment aggregate - one purchase attempt for a subscription plan.
///
/// # Invariants
///
/// - `order_id` is unique across all payments
/// - Status transitions follow state machine rules (settles once)
/// - `completed_at` is set exactly when status becomes Completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier for this payment.
    pub id: PaymentId,

    /// Merchant order identifier sent to the gateway.
    pub order_id: OrderId,

    /// User who initiated this payment.
    pub user_id: UserId,

    /// Amount charged.
    pub amount: Money,

    /// Currency code sent to the gateway ("TL").
    pub currency: String,

    /// Plan being purchased.
    pub plan: PlanType,

    /// Billing cycle being purchased.
    pub billing_cycle: BillingCycle,

    /// Current status in the settlement lifecycle.
    pub status: PaymentStatus,

    /// Accumulated gateway notification payloads.
    pub gateway_response: Option<serde_json::Value>,

    /// When the payment completed successfully.
    pub completed_at: Option<Timestamp>,

    /// When the payment was created.
    pub created_at: Timestamp,
}

impl Payment {
    /// Creates a new pending payment at initiation time.
    pub fn create(
        order_id: OrderId,
        user_id: UserId,
        amount: Money,
        currency: impl Into<String>,
        plan: PlanType,
        billing_cycle: BillingCycle,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            order_id,
            user_id,
            amount,
            currency: currency.into(),
            plan,
            billing_cycle,
            status: PaymentStatus::Pending,
            gateway_response: None,
            completed_at: None,
            created_at: Timestamp::now(),
        }
    }

    /// Marks the payment completed at the given moment.
    ///
    /// # Errors
    ///
    /// Returns error if the payment has already settled.
    pub fn complete(&mut self, at: Timestamp) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Completed)?;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Marks the payment failed.
    ///
    /// # Errors
    ///
    /// Returns error if the payment has already settled.
    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Failed)?;
        Ok(())
    }

    /// Returns true once the payment completed successfully.
    ///
    /// Used to acknowledge repeat success notifications without
    /// re-running the subscription transition.
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: PaymentStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition payment from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::plan_price;

    fn test_payment() -> Payment {
        Payment::create(
            OrderId::generate(),
            UserId::new("user-123").unwrap(),
            plan_price(PlanType::Personal, BillingCycle::Monthly),
            "TL",
            PlanType::Personal,
            BillingCycle::Monthly,
        )
    }

    // Construction tests

    #[test]
    fn create_starts_pending() {
        let payment = test_payment();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.completed_at.is_none());
        assert!(payment.gateway_response.is_none());
        assert!(!payment.is_completed());
    }

    #[test]
    fn create_carries_plan_and_amount() {
        let payment = test_payment();
        assert_eq!(payment.plan, PlanType::Personal);
        assert_eq!(payment.billing_cycle, BillingCycle::Monthly);
        assert_eq!(payment.amount.kurus(), 3000);
        assert_eq!(payment.currency, "TL");
    }

    #[test]
    fn create_generates_distinct_ids() {
        let a = test_payment();
        let b = test_payment();
        assert_ne!(a.id, b.id);
        assert_ne!(a.order_id, b.order_id);
    }

    // Transition tests

    #[test]
    fn complete_sets_status_and_timestamp() {
        let mut payment = test_payment();
        let at = Timestamp::now();

        payment.complete(at).unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.completed_at, Some(at));
        assert!(payment.is_completed());
    }

    #[test]
    fn fail_sets_status_without_completion_time() {
        let mut payment = test_payment();

        payment.fail().unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert!(payment.completed_at.is_none());
        assert!(!payment.is_completed());
    }

    #[test]
    fn complete_twice_is_rejected() {
        let mut payment = test_payment();
        payment.complete(Timestamp::now()).unwrap();

        let err = payment.complete(Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        // First completion timestamp survives
        assert!(payment.completed_at.is_some());
    }

    #[test]
    fn fail_after_complete_is_rejected() {
        let mut payment = test_payment();
        payment.complete(Timestamp::now()).unwrap();

        let err = payment.fail().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(payment.status, PaymentStatus::Completed);
    }

    #[test]
    fn complete_after_fail_is_rejected() {
        let mut payment = test_payment();
        payment.fail().unwrap();

        let err = payment.complete(Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(payment.status, PaymentStatus::Failed);
    }

    #[test]
    fn serializes_with_snake_case_status() {
        let payment = test_payment();
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["plan"], "personal");
        assert_eq!(json["billing_cycle"], "monthly");
    }
}
