//! PayTR gateway configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// PayTR gateway configuration
///
/// The merchant key and salt are the gateway's shared secrets; they are
/// held as `SecretString` so they never land in logs or debug output.
#[derive(Debug, Clone, Deserialize)]
pub struct PaytrConfig {
    /// Merchant number issued by the gateway (non-secret)
    pub merchant_id: String,

    /// Merchant key (HMAC key for all gateway signatures)
    pub merchant_key: SecretString,

    /// Merchant salt (concatenated into the signed material)
    pub merchant_salt: SecretString,

    /// Base URL for the gateway
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for the outbound token call in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Route payments through the gateway's test mode
    #[serde(default)]
    pub test_mode: bool,

    /// Currency code sent to the gateway
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl PaytrConfig {
    /// Get the outbound call timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate PayTR configuration
    ///
    /// The process must never accept traffic with blank credentials: a
    /// blank salt or key would make every signature check fail open or
    /// closed in ways that are hard to diagnose in production.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.merchant_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYTR__MERCHANT_ID"));
        }
        if self.merchant_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYTR__MERCHANT_KEY"));
        }
        if self.merchant_salt.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYTR__MERCHANT_SALT"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://www.paytr.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_currency() -> String {
    "TL".to_string()
}
