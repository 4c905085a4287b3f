//! Webhook error types for PayTR notification handling.
//!
//! Defines all error conditions that can occur while processing a gateway
//! notification, with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Notification hash did not match the expected signature.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Failed to parse a notification field.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the notification form.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The referenced order has no payment record.
    #[error("Payment not found")]
    PaymentNotFound,

    /// Attempted payment state transition is not valid.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should retry delivering this webhook.
    ///
    /// PayTR keeps redelivering until it receives an OK body, so this
    /// governs which failures we expect to resolve on a later attempt.
    /// An unknown order is a stale or forged notification, not a
    /// transient condition, so it is not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Anything other than 200 with an OK body causes the gateway to
    /// redeliver the notification later.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failure - reject outright
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,

            // Malformed notification - reject before any side effects
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }

            // Unknown order - likely misrouted or not yet committed
            WebhookError::PaymentNotFound => StatusCode::NOT_FOUND,

            // Server errors - gateway will retry
            WebhookError::InvalidTransition(_) | WebhookError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Converts DomainError to WebhookError for repository operations.
impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        let err = WebhookError::InvalidSignature;
        assert_eq!(format!("{}", err), "Invalid signature");
    }

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("bad order id".to_string());
        assert_eq!(format!("{}", err), "Parse error: bad order id");
    }

    #[test]
    fn missing_field_displays_field_name() {
        let err = WebhookError::MissingField("merchant_oid");
        assert_eq!(format!("{}", err), "Missing field: merchant_oid");
    }

    #[test]
    fn invalid_transition_displays_reason() {
        let err =
            WebhookError::InvalidTransition("cannot go from failed to completed".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid state transition: cannot go from failed to completed"
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Retryability Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn database_error_is_retryable() {
        let err = WebhookError::Database("connection failed".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn payment_not_found_is_not_retryable() {
        let err = WebhookError::PaymentNotFound;
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_signature_is_not_retryable() {
        let err = WebhookError::InvalidSignature;
        assert!(!err.is_retryable());
    }

    #[test]
    fn parse_error_is_not_retryable() {
        let err = WebhookError::ParseError("bad form".to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn missing_field_is_not_retryable() {
        let err = WebhookError::MissingField("hash");
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_transition_is_not_retryable() {
        let err = WebhookError::InvalidTransition("bad state".to_string());
        assert!(!err.is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_returns_unauthorized() {
        let err = WebhookError::InvalidSignature;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn parse_error_returns_bad_request() {
        let err = WebhookError::ParseError("syntax error".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_field_returns_bad_request() {
        let err = WebhookError::MissingField("total_amount");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn payment_not_found_returns_not_found() {
        let err = WebhookError::PaymentNotFound;
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_transition_returns_internal_error() {
        let err = WebhookError::InvalidTransition("bad".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn database_error_returns_internal_error() {
        let err = WebhookError::Database("connection lost".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_error_converts_to_database_error() {
        use crate::domain::foundation::ErrorCode;
        let domain_err = DomainError::new(ErrorCode::DatabaseError, "insert failed");
        let err: WebhookError = domain_err.into();
        assert!(matches!(err, WebhookError::Database(_)));
    }
}
