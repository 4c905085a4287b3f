//! Billing-specific error types.
//!
//! Errors for plan selection, payment initiation, and subscription
//! transitions.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | PaymentNotFound | 404 |
//! | DuplicateOrder | 409 |
//! | InvalidPlanType | 400 |
//! | InvalidBillingCycle | 400 |
//! | InvalidAmount | 400 |
//! | ValidationFailed | 400 |
//! | Unauthorized | 401 |
//! | InvalidState | 409 |
//! | GatewayFailed | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};

/// Billing-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// No payment record exists for this order identifier.
    PaymentNotFound(OrderId),

    /// A payment with this order identifier already exists.
    DuplicateOrder(OrderId),

    /// Unknown plan name. Unknown plans are rejected, never defaulted.
    InvalidPlanType(String),

    /// Unknown billing cycle name.
    InvalidBillingCycle(String),

    /// Amount could not be parsed or is out of range.
    InvalidAmount(String),

    /// The payment gateway rejected or failed the token request.
    GatewayFailed { reason: String, retryable: bool },

    /// Invalid state for the requested operation.
    InvalidState { current: String, attempted: String },

    /// Caller identity is missing or invalid.
    Unauthorized,

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl BillingError {
    // Constructor functions for cleaner error creation

    pub fn payment_not_found(order_id: OrderId) -> Self {
        BillingError::PaymentNotFound(order_id)
    }

    pub fn duplicate_order(order_id: OrderId) -> Self {
        BillingError::DuplicateOrder(order_id)
    }

    pub fn invalid_plan_type(plan: impl Into<String>) -> Self {
        BillingError::InvalidPlanType(plan.into())
    }

    pub fn invalid_billing_cycle(cycle: impl Into<String>) -> Self {
        BillingError::InvalidBillingCycle(cycle.into())
    }

    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        BillingError::InvalidAmount(reason.into())
    }

    pub fn gateway_failed(reason: impl Into<String>, retryable: bool) -> Self {
        BillingError::GatewayFailed {
            reason: reason.into(),
            retryable,
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        BillingError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            BillingError::DuplicateOrder(_) => ErrorCode::PaymentExists,
            BillingError::InvalidPlanType(_) => ErrorCode::InvalidPlan,
            BillingError::InvalidBillingCycle(_) => ErrorCode::InvalidBillingCycle,
            BillingError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            BillingError::GatewayFailed { .. } => ErrorCode::GatewayError,
            BillingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            BillingError::Unauthorized => ErrorCode::Unauthorized,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BillingError::PaymentNotFound(order_id) => {
                format!("No payment found for order: {}", order_id)
            }
            BillingError::DuplicateOrder(order_id) => {
                format!("A payment already exists for order: {}", order_id)
            }
            BillingError::InvalidPlanType(plan) => format!("Invalid plan type: {}", plan),
            BillingError::InvalidBillingCycle(cycle) => {
                format!("Invalid billing cycle: {}", cycle)
            }
            BillingError::InvalidAmount(reason) => format!("Invalid amount: {}", reason),
            BillingError::GatewayFailed { reason, .. } => {
                format!("Payment gateway request failed: {}", reason)
            }
            BillingError::InvalidState { current, attempted } => {
                format!("Cannot {} payment in {} state", attempted, current)
            }
            BillingError::Unauthorized => "Missing or invalid caller identity".to_string(),
            BillingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            BillingError::Infrastructure(_) => true,
            BillingError::GatewayFailed { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidPlan => BillingError::InvalidPlanType(err.to_string()),
            ErrorCode::InvalidBillingCycle => {
                BillingError::InvalidBillingCycle(err.to_string())
            }
            ErrorCode::InvalidAmount => BillingError::InvalidAmount(err.to_string()),
            ErrorCode::InvalidStateTransition => BillingError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.to_string(),
            },
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => BillingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.to_string(),
            },
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
