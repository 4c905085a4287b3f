//! PayTR signature verification.
//!
//! PayTR authenticates both directions with the same construction: an
//! HMAC-SHA256 over a fixed concatenation of request fields (no
//! separators), keyed by the merchant key, with the merchant salt
//! concatenated into the signed material. The digest travels base64
//! encoded.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::{PaytrNotification, WebhookError};

/// Fields signed by the outbound token request, in signature order.
///
/// The order is part of the wire contract with the gateway; reordering
/// any field produces a hash PayTR will reject.
#[derive(Debug, Clone, Copy)]
pub struct TokenSignatureInput<'a> {
    pub user_ip: &'a str,
    pub merchant_oid: &'a str,
    pub email: &'a str,
    pub payment_amount: &'a str,
    pub user_basket: &'a str,
    pub no_installment: &'a str,
    pub max_installment: &'a str,
    pub currency: &'a str,
    pub test_mode: &'a str,
}

/// Verifies inbound notification hashes and signs outbound token requests.
#[derive(Debug, Clone)]
pub struct PaytrSignatureVerifier {
    merchant_id: String,
    merchant_key: SecretString,
    merchant_salt: SecretString,
}

impl PaytrSignatureVerifier {
    /// Creates a verifier from merchant credentials.
    pub fn new(
        merchant_id: impl Into<String>,
        merchant_key: SecretString,
        merchant_salt: SecretString,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            merchant_key,
            merchant_salt,
        }
    }

    /// Verifies an inbound notification's hash.
    ///
    /// # Verification Steps
    ///
    /// 1. Reject if any signed field or the hash itself is missing
    ///    (nothing is hashed in that case)
    /// 2. Compute the expected signature over
    ///    `merchant_oid + salt + status + total_amount`
    /// 3. Compare base64 strings in constant time
    ///
    /// # Errors
    ///
    /// - `MissingField` - A signed field or the hash is empty
    /// - `InvalidSignature` - Hash does not match
    pub fn verify(&self, notification: &PaytrNotification) -> Result<(), WebhookError> {
        if notification.merchant_oid.is_empty() {
            return Err(WebhookError::MissingField("merchant_oid"));
        }
        if notification.status.is_empty() {
            return Err(WebhookError::MissingField("status"));
        }
        if notification.total_amount.is_empty() {
            return Err(WebhookError::MissingField("total_amount"));
        }
        if notification.hash.is_empty() {
            return Err(WebhookError::MissingField("hash"));
        }

        let expected = self.notification_signature(
            &notification.merchant_oid,
            &notification.status,
            &notification.total_amount,
        );

        if !constant_time_compare(expected.as_bytes(), notification.hash.as_bytes()) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Computes the expected hash for an inbound notification.
    pub fn notification_signature(
        &self,
        merchant_oid: &str,
        status: &str,
        total_amount: &str,
    ) -> String {
        let mut signed = String::with_capacity(
            merchant_oid.len() + status.len() + total_amount.len() + 32,
        );
        signed.push_str(merchant_oid);
        signed.push_str(self.merchant_salt.expose_secret());
        signed.push_str(status);
        signed.push_str(total_amount);

        self.sign(signed.as_bytes())
    }

    /// Computes the `paytr_token` signature for an outbound token request.
    ///
    /// Signed material is the merchant id, then the request fields in
    /// `TokenSignatureInput` order, then the merchant salt.
    pub fn token_signature(&self, input: &TokenSignatureInput<'_>) -> String {
        let mut signed = String::new();
        signed.push_str(&self.merchant_id);
        signed.push_str(input.user_ip);
        signed.push_str(input.merchant_oid);
        signed.push_str(input.email);
        signed.push_str(input.payment_amount);
        signed.push_str(input.user_basket);
        signed.push_str(input.no_installment);
        signed.push_str(input.max_installment);
        signed.push_str(input.currency);
        signed.push_str(input.test_mode);
        signed.push_str(self.merchant_salt.expose_secret());

        self.sign(signed.as_bytes())
    }

    /// Returns the merchant id this verifier signs for.
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    fn sign(&self, data: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.merchant_key.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(data);
        BASE64.encode(mac.finalize().into_bytes())
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
