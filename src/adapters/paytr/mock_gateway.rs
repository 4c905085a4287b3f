//! Mock payment gateway for testing.
//!
//! Provides a configurable mock implementation of `PaymentGateway` for unit
//! and integration tests. Supports:
//! - Pre-configured tokens
//! - Error injection
//! - Request capture for assertions

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{GatewayError, PaymentGateway, TokenRequest, TokenResponse};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaytrGateway::new();
///
/// // Configure the issued token
/// mock.set_token("tok_test");
///
/// // Inject errors
/// mock.set_error(GatewayError::timeout("simulated"));
///
/// // Assert on captured requests
/// assert_eq!(mock.requests().len(), 1);
/// ```
#[derive(Default)]
pub struct MockPaytrGateway {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Token to issue (defaults to a generated one).
    next_token: Option<String>,

    /// Error to return on next call.
    next_error: Option<GatewayError>,

    /// Captured requests for assertions.
    requests: Vec<TokenRequest>,

    /// Calls served so far, used for generated tokens.
    calls: u64,
}

impl MockPaytrGateway {
    /// Create a new mock gateway with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token to issue on the next call.
    pub fn set_token(&self, token: impl Into<String>) {
        self.inner.lock().unwrap().next_token = Some(token.into());
    }

    /// Set an error to return on the next call.
    pub fn set_error(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Get all captured token requests.
    pub fn requests(&self) -> Vec<TokenRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Get the number of calls served.
    pub fn call_count(&self) -> u64 {
        self.inner.lock().unwrap().calls
    }
}

#[async_trait]
impl PaymentGateway for MockPaytrGateway {
    async fn request_token(&self, request: TokenRequest) -> Result<TokenResponse, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.calls += 1;
        state.requests.push(request);

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let token = state
            .next_token
            .take()
            .unwrap_or_else(|| format!("mock-token-{}", state.calls));

        let iframe_url = format!("https://www.paytr.com/odeme/guvenli/{}", token);

        Ok(TokenResponse { token, iframe_url })
    }
}
