//! Payment status state machine.
//!
//! A payment starts pending and settles exactly once, to completed or
//! failed. Both outcomes are terminal.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created at initiation, awaiting the gateway's webhook notification.
    Pending,

    /// Gateway confirmed the charge. Grants a subscription.
    Completed,

    /// Gateway reported the charge failed or was abandoned.
    Failed,
}

impl PaymentStatus {
    /// Maps the gateway's status field to a terminal payment status.
    ///
    /// PayTR sends "1" for success; every other value is a failure.
    pub fn from_gateway_status(status: &str) -> Self {
        if status == "1" {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        }
    }

    /// Returns true once the payment has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.is_terminal()
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!((self, target), (Pending, Completed) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed => vec![],
            Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_transition_to_completed() {
        let status = PaymentStatus::Pending;
        assert!(status.can_transition_to(&PaymentStatus::Completed));

        let result = status.transition_to(PaymentStatus::Completed);
        assert_eq!(result, Ok(PaymentStatus::Completed));
    }

    #[test]
    fn pending_can_transition_to_failed() {
        let status = PaymentStatus::Pending;
        assert!(status.can_transition_to(&PaymentStatus::Failed));

        let result = status.transition_to(PaymentStatus::Failed);
        assert_eq!(result, Ok(PaymentStatus::Failed));
    }

    #[test]
    fn completed_cannot_transition_anywhere() {
        let status = PaymentStatus::Completed;
        assert!(status.transition_to(PaymentStatus::Failed).is_err());
        assert!(status.transition_to(PaymentStatus::Pending).is_err());
        assert!(status.transition_to(PaymentStatus::Completed).is_err());
    }

    #[test]
    fn failed_cannot_transition_anywhere() {
        let status = PaymentStatus::Failed;
        assert!(status.transition_to(PaymentStatus::Completed).is_err());
        assert!(status.transition_to(PaymentStatus::Pending).is_err());
    }

    #[test]
    fn completed_and_failed_are_terminal() {
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn is_settled_matches_terminality() {
        assert!(PaymentStatus::Completed.is_settled());
        assert!(PaymentStatus::Failed.is_settled());
        assert!(!PaymentStatus::Pending.is_settled());
    }

    #[test]
    fn gateway_status_one_maps_to_completed() {
        assert_eq!(
            PaymentStatus::from_gateway_status("1"),
            PaymentStatus::Completed
        );
    }

    #[test]
    fn gateway_status_other_values_map_to_failed() {
        assert_eq!(
            PaymentStatus::from_gateway_status("0"),
            PaymentStatus::Failed
        );
        assert_eq!(
            PaymentStatus::from_gateway_status(""),
            PaymentStatus::Failed
        );
        assert_eq!(
            PaymentStatus::from_gateway_status("success"),
            PaymentStatus::Failed
        );
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&PaymentStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
