//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for the billing API and wires
//! routes to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_plans, handle_paytr_webhook, health, initiate_payment, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
///
/// ## User Endpoints (require the auth proxy's identity header)
/// - `POST /initiate` - Start a plan checkout against the gateway
/// - `GET /plans` - The plan catalog with prices
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/initiate", post(initiate_payment))
        .route("/plans", get(get_plans))
}

/// Create the gateway webhook router.
///
/// This is separate from the main billing routes because webhooks don't
/// carry user authentication (they're verified via signature).
///
/// # Routes
/// - `POST /paytr` - Handle gateway payment notifications
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/paytr", post(handle_paytr_webhook))
}

/// Create the complete application router.
///
/// Combines billing routes, webhook routes, and the liveness probe into
/// a single router. Callers supply the state:
///
/// ```ignore
/// let app = app_router().with_state(state);
/// ```
pub fn app_router() -> Router<BillingAppState> {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .nest("/billing", billing_routes())
                .nest("/webhooks", webhook_routes()),
        )
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::adapters::paytr::MockPaytrGateway;
    use crate::application::handlers::billing::CheckoutSettings;
    use crate::domain::billing::{Payment, PaytrSignatureVerifier, Subscription};
    use crate::domain::foundation::{DomainError, OrderId, UserId};
    use crate::ports::{
        PaymentRepository, SaveResult, SubscriptionRepository, WebhookEventRecord,
        WebhookEventRepository,
    };
    use async_trait::async_trait;
    use secrecy::SecretString;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations (shared shape with handlers tests)
    // ════════════════════════════════════════════════════════════════════════════

    struct MockPaymentRepository {
        payments: Mutex<Vec<Payment>>,
    }

    impl MockPaymentRepository {
        fn new() -> Self {
            Self {
                payments: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaymentRepository for MockPaymentRepository {
        async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
            self.payments.lock().unwrap().push(payment.clone());
            Ok(())
        }

        async fn find_by_order_id(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<Payment>, DomainError> {
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| &p.order_id == order_id)
                .cloned())
        }

        async fn record_outcome(
            &self,
            _payment: &Payment,
            _gateway_payload: &serde_json::Value,
        ) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct MockWebhookEventRepository;

    #[async_trait]
    impl WebhookEventRepository for MockWebhookEventRepository {
        async fn find_by_event_id(
            &self,
            _event_id: &str,
        ) -> Result<Option<WebhookEventRecord>, DomainError> {
            Ok(None)
        }

        async fn save(&self, _record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
            Ok(SaveResult::Inserted)
        }
    }

    struct MockSubscriptionRepository;

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
        async fn replace_active(&self, _subscription: &Subscription) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_active_by_user(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<Subscription>, DomainError> {
            Ok(None)
        }
    }

    fn test_state() -> BillingAppState {
        BillingAppState {
            payments: Arc::new(MockPaymentRepository::new()),
            webhook_events: Arc::new(MockWebhookEventRepository),
            subscriptions: Arc::new(MockSubscriptionRepository),
            gateway: Arc::new(MockPaytrGateway::new()),
            verifier: Arc::new(PaytrSignatureVerifier::new(
                "123456",
                SecretString::new("test_merchant_key".to_string()),
                SecretString::new("test_merchant_salt".to_string()),
            )),
            checkout: CheckoutSettings::default(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Router Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn billing_routes_creates_router() {
        let router = billing_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn webhook_routes_creates_router() {
        let router = webhook_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn app_router_creates_combined_router() {
        let router = app_router();
        let _: Router<()> = router.with_state(test_state());
    }

    // Full request/response coverage lives in tests/webhook_http_integration.rs.
}
