//! PayTR gateway adapter.
//!
//! Implements the `PaymentGateway` port against PayTR's token endpoint.
//! The adapter transmits a request the domain layer has already signed;
//! it never touches the merchant key or salt.
//!
//! # Protocol
//!
//! PayTR's token exchange is a form-POST answered with JSON:
//! `{"status": "success", "token": "..."}` on acceptance,
//! `{"status": "failed", "reason": "..."}` on rejection. Rejections
//! arrive with HTTP 200, so the body status is the real verdict.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{GatewayError, PaymentGateway, TokenRequest, TokenResponse};

/// Default timeout for the outbound token call.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// PayTR gateway configuration.
#[derive(Debug, Clone)]
pub struct PaytrGatewayConfig {
    /// Merchant number issued by the gateway (non-secret).
    merchant_id: String,

    /// Base URL for the gateway (default: https://www.paytr.com).
    base_url: String,

    /// Timeout for the outbound token call.
    timeout: Duration,
}

impl PaytrGatewayConfig {
    /// Create a new gateway configuration for the given merchant.
    pub fn new(merchant_id: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            base_url: "https://www.paytr.com".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the outbound call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// PayTR gateway adapter.
///
/// Implements `PaymentGateway` over the token endpoint.
pub struct PaytrGatewayAdapter {
    config: PaytrGatewayConfig,
    http_client: reqwest::Client,
}

impl PaytrGatewayAdapter {
    /// Create a new PayTR adapter with the given configuration.
    pub fn new(config: PaytrGatewayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Interpret the token endpoint's JSON body.
    fn parse_token_response(&self, body: &str) -> Result<TokenResponse, GatewayError> {
        let parsed: PaytrTokenBody = serde_json::from_str(body).map_err(|e| {
            tracing::warn!(error = %e, "Unparseable token response from gateway");
            GatewayError::invalid_response(format!("Unparseable token response: {}", e))
        })?;

        if parsed.status != "success" {
            let reason = parsed
                .reason
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(GatewayError::rejected(reason));
        }

        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::invalid_response("Token response carried no token"))?;

        let iframe_url = format!("{}/odeme/guvenli/{}", self.config.base_url, token);

        Ok(TokenResponse { token, iframe_url })
    }
}

/// Raw JSON body of the token endpoint's answer.
#[derive(Debug, Deserialize)]
struct PaytrTokenBody {
    status: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[async_trait]
impl PaymentGateway for PaytrGatewayAdapter {
    async fn request_token(&self, request: TokenRequest) -> Result<TokenResponse, GatewayError> {
        let url = format!("{}/odeme/api/get-token", self.config.base_url);
        let merchant_oid = request.merchant_oid.clone();

        let mut params = vec![
            ("merchant_id", self.config.merchant_id.clone()),
            ("merchant_oid", request.merchant_oid),
            ("user_ip", request.user_ip),
            ("email", request.email),
            ("payment_amount", request.payment_amount),
            ("user_basket", request.user_basket),
            ("user_name", request.user_name),
            ("no_installment", request.no_installment),
            ("max_installment", request.max_installment),
            ("currency", request.currency),
            ("test_mode", request.test_mode),
            ("paytr_token", request.paytr_token),
        ];

        if let Some(phone) = request.user_phone {
            params.push(("user_phone", phone));
        }

        let response = self
            .http_client
            .post(&url)
            .timeout(self.config.timeout)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::warn!(merchant_oid = %merchant_oid, "Token request timed out");
                    GatewayError::timeout(format!("Token request timed out: {}", e))
                } else {
                    tracing::warn!(merchant_oid = %merchant_oid, error = %e, "Token request failed");
                    GatewayError::network(format!("Token request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                merchant_oid = %merchant_oid,
                http_status = %status,
                body = %body,
                "Token endpoint returned non-success HTTP status"
            );
            return Err(GatewayError::invalid_response(format!(
                "Token endpoint returned HTTP {}",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            GatewayError::invalid_response(format!("Failed to read token response: {}", e))
        })?;

        let result = self.parse_token_response(&body);

        if let Err(err) = &result {
            tracing::warn!(
                merchant_oid = %merchant_oid,
                code = %err.code,
                reason = %err.message,
                "Gateway did not issue a token"
            );
        }

        result
    }
}
