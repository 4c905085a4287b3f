//! Payment gateway port for external checkout processing.
//!
//! Defines the contract for the PayTR token exchange: the service posts a
//! signed initiation request and receives a single-use token that the
//! storefront embeds in the gateway's hosted iframe.
//!
//! # Design
//!
//! - **Signed upstream**: the `paytr_token` signature is computed in the
//!   domain layer before the request reaches this port; implementations
//!   transmit it, they never hold the merchant key
//! - **String-typed amounts and flags**: every field that participates in
//!   the signature crosses this boundary exactly as signed
//! - **Retryable taxonomy**: transport failures are distinguishable from
//!   gateway rejections so callers can decide whether retrying can help

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Port for the gateway token exchange.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Exchange a signed initiation request for a checkout token.
    ///
    /// # Errors
    ///
    /// - `Rejected` if the gateway refused the request (not retryable)
    /// - `Timeout` / `NetworkError` on transport failure (retryable)
    /// - `InvalidResponse` if the gateway answered with an unparseable body
    async fn request_token(&self, request: TokenRequest) -> Result<TokenResponse, GatewayError>;
}

/// Signed request for a checkout token.
///
/// Field values must byte-match what was fed into the `paytr_token`
/// signature; the gateway recomputes the hash on its side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Merchant order identifier for this checkout attempt.
    pub merchant_oid: String,

    /// Client IP forwarded to the gateway for risk checks.
    pub user_ip: String,

    /// Buyer email.
    pub email: String,

    /// Amount in kurus, as a decimal string.
    pub payment_amount: String,

    /// Base64-encoded basket JSON.
    pub user_basket: String,

    /// Buyer display name.
    pub user_name: String,

    /// Buyer phone, when the caller supplied one.
    pub user_phone: Option<String>,

    /// "1" to forbid installments.
    pub no_installment: String,

    /// Maximum installment count ("0" when installments are forbidden).
    pub max_installment: String,

    /// Currency code ("TL").
    pub currency: String,

    /// "1" routes the payment through the gateway's test mode.
    pub test_mode: String,

    /// Base64 HMAC signature over the fields above.
    pub paytr_token: String,
}

/// Successful token exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Single-use checkout token.
    pub token: String,

    /// Hosted iframe URL embedding the token.
    pub iframe_url: String,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    /// Create a rejection error from the gateway's reason string.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Rejected, reason)
    }

    /// Create an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        DomainError::new(ErrorCode::GatewayError, err.message)
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Outbound call exceeded the configured timeout.
    Timeout,

    /// Gateway refused the request (bad hash, bad merchant, bad amount).
    Rejected,

    /// Gateway answered with a body we could not parse.
    InvalidResponse,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError | GatewayErrorCode::Timeout
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::Timeout => "timeout",
            GatewayErrorCode::Rejected => "rejected",
            GatewayErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}
