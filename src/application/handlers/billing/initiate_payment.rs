//! InitiatePaymentHandler - Command handler for starting a gateway checkout.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::domain::billing::{
    plan_price, BillingCycle, BillingError, Money, Payment, PaytrSignatureVerifier, PlanType,
    TokenSignatureInput,
};
use crate::domain::foundation::{OrderId, UserId};
use crate::ports::{PaymentGateway, PaymentRepository, TokenRequest};

/// Installments are disabled for plan purchases.
const NO_INSTALLMENT: &str = "1";
const MAX_INSTALLMENT: &str = "0";

/// Command to initiate a plan checkout.
#[derive(Debug, Clone)]
pub struct InitiatePaymentCommand {
    pub user_id: UserId,
    pub plan_type: String,
    pub billing_cycle: String,
    pub user_email: String,
    pub user_name: String,
    pub user_phone: Option<String>,
    /// Client IP forwarded to the gateway; participates in the signature.
    pub user_ip: String,
}

/// Result of successful checkout initiation.
#[derive(Debug, Clone)]
pub struct InitiatePaymentResult {
    pub payment: Payment,
    pub token: String,
    pub iframe_url: String,
}

/// Non-secret request parameters shared by every checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Currency code sent to the gateway.
    pub currency: String,
    /// Routes payments through the gateway's test mode.
    pub test_mode: bool,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: "TL".to_string(),
            test_mode: false,
        }
    }
}

/// Handler for initiating a plan checkout against the gateway.
///
/// Creates a pending payment, signs a token request, and exchanges it for
/// the checkout token the storefront embeds. The payment settles when the
/// webhook confirms the outcome.
pub struct InitiatePaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    verifier: Arc<PaytrSignatureVerifier>,
    settings: CheckoutSettings,
}

impl InitiatePaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        verifier: Arc<PaytrSignatureVerifier>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            payments,
            gateway,
            verifier,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiatePaymentCommand,
    ) -> Result<InitiatePaymentResult, BillingError> {
        // 1. Parse and validate the requested plan
        let plan: PlanType = cmd.plan_type.parse()?;
        let cycle: BillingCycle = cmd.billing_cycle.parse()?;

        if cmd.user_email.trim().is_empty() {
            return Err(BillingError::validation("userEmail", "Email is required"));
        }
        if cmd.user_name.trim().is_empty() {
            return Err(BillingError::validation("userName", "Name is required"));
        }

        // 2. Price from the catalog, never from the caller
        let amount = plan_price(plan, cycle);

        // 3. Create and persist the pending payment
        let order_id = OrderId::generate();
        let payment = Payment::create(
            order_id,
            cmd.user_id.clone(),
            amount,
            self.settings.currency.clone(),
            plan,
            cycle,
        );
        self.payments.save(&payment).await?;

        // 4. Sign the token request
        let payment_amount = amount.kurus_string();
        let user_basket = encode_basket(plan, cycle, amount);
        let test_mode = if self.settings.test_mode { "1" } else { "0" };

        let paytr_token = self.verifier.token_signature(&TokenSignatureInput {
            user_ip: &cmd.user_ip,
            merchant_oid: payment.order_id.as_str(),
            email: &cmd.user_email,
            payment_amount: &payment_amount,
            user_basket: &user_basket,
            no_installment: NO_INSTALLMENT,
            max_installment: MAX_INSTALLMENT,
            currency: &self.settings.currency,
            test_mode,
        });

        // 5. Exchange it for a checkout token
        let response = self
            .gateway
            .request_token(TokenRequest {
                merchant_oid: payment.order_id.as_str().to_string(),
                user_ip: cmd.user_ip,
                email: cmd.user_email,
                payment_amount,
                user_basket,
                user_name: cmd.user_name,
                user_phone: cmd.user_phone,
                no_installment: NO_INSTALLMENT.to_string(),
                max_installment: MAX_INSTALLMENT.to_string(),
                currency: self.settings.currency.clone(),
                test_mode: test_mode.to_string(),
                paytr_token,
            })
            .await
            .map_err(|e| BillingError::gateway_failed(e.message.clone(), e.retryable))?;

        Ok(InitiatePaymentResult {
            payment,
            token: response.token,
            iframe_url: response.iframe_url,
        })
    }
}

/// Encodes the single-item basket the gateway displays at checkout.
///
/// Format per the gateway contract: base64 of a JSON array of
/// `[label, unit price, quantity]` rows.
fn encode_basket(plan: PlanType, cycle: BillingCycle, amount: Money) -> String {
    let label = format!("{} Plan ({})", plan.display_name(), cycle.as_str());
    let basket = serde_json::json!([[label, amount.major_string(), 1]]);
    BASE64.encode(basket.to_string())
}
