//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command handlers.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Form;

use crate::application::handlers::billing::{
    CheckoutSettings, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    InitiatePaymentCommand, InitiatePaymentHandler,
};
use crate::domain::billing::{
    plan_price, BillingCycle, BillingError, PaytrSignatureVerifier, PlanType, WebhookError,
};
use crate::domain::foundation::UserId;
use crate::ports::{
    PaymentGateway, PaymentRepository, SubscriptionRepository, WebhookEventRepository,
};

use super::dto::{
    ErrorResponse, HealthResponse, InitiatePaymentRequest, InitiatePaymentResponse,
    PaytrWebhookForm, PlanCatalogEntry, PlanCatalogResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct BillingAppState {
    pub payments: Arc<dyn PaymentRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub verifier: Arc<PaytrSignatureVerifier>,
    pub checkout: CheckoutSettings,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn initiate_payment_handler(&self) -> InitiatePaymentHandler {
        InitiatePaymentHandler::new(
            self.payments.clone(),
            self.gateway.clone(),
            self.verifier.clone(),
            self.checkout.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.payments.clone(),
            self.webhook_events.clone(),
            self.subscriptions.clone(),
            self.verifier.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (populated by the platform's auth proxy)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from the request.
///
/// The service runs behind the platform's auth proxy, which verifies the
/// session and forwards the caller identity in the `X-User-Id` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

/// Resolves the client IP forwarded by the proxy in front of the service.
///
/// The IP participates in the gateway token signature, so initiation uses
/// whatever the proxy reports rather than the socket peer address.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("X-Real-Ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/initiate - Start a plan checkout against the gateway
pub async fn initiate_payment(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.initiate_payment_handler();
    let cmd = InitiatePaymentCommand {
        user_id: user.user_id,
        plan_type: request.plan_type,
        billing_cycle: request.billing_cycle,
        user_email: request.user_email,
        user_name: request.user_name,
        user_phone: request.user_phone,
        user_ip: client_ip(&headers),
    };

    let result = handler.handle(cmd).await?;

    let response = InitiatePaymentResponse {
        payment_token: result.token,
        iframe_url: result.iframe_url,
        order_id: result.payment.order_id.to_string(),
        amount: result.payment.amount.major_string(),
    };

    Ok(Json(response))
}

/// GET /api/billing/plans - The pricing table the initiation flow charges from
pub async fn get_plans(State(state): State<BillingAppState>) -> impl IntoResponse {
    let mut plans = Vec::with_capacity(PlanType::ALL.len() * BillingCycle::ALL.len());
    for plan in PlanType::ALL {
        for cycle in BillingCycle::ALL {
            plans.push(PlanCatalogEntry {
                plan_type: plan.as_str().to_string(),
                display_name: plan.display_name().to_string(),
                billing_cycle: cycle.as_str().to_string(),
                price: plan_price(plan, cycle).major_string(),
                currency: state.checkout.currency.clone(),
            });
        }
    }

    Json(PlanCatalogResponse { plans })
}

/// POST /api/webhooks/paytr - Handle gateway payment notifications
pub async fn handle_paytr_webhook(
    State(state): State<BillingAppState>,
    Form(form): Form<PaytrWebhookForm>,
) -> Result<impl IntoResponse, WebhookApiError> {
    let notification = form.into_notification()?;

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand { notification };

    handler.handle(cmd).await?;

    // The gateway stops redelivering only on a literal OK body with 200.
    Ok((StatusCode::OK, "OK"))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl From<crate::domain::foundation::DomainError> for BillingApiError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            BillingError::PaymentNotFound(_) => (StatusCode::NOT_FOUND, "PAYMENT_NOT_FOUND"),
            BillingError::DuplicateOrder(_) => (StatusCode::CONFLICT, "DUPLICATE_ORDER"),
            BillingError::InvalidPlanType(_) => (StatusCode::BAD_REQUEST, "INVALID_PLAN_TYPE"),
            BillingError::InvalidBillingCycle(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_BILLING_CYCLE")
            }
            BillingError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            // The storefront contract is 400 for caller mistakes and 500
            // for everything upstream, so gateway failures land on 500.
            BillingError::GatewayFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "GATEWAY_ERROR")
            }
            BillingError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION"),
            BillingError::Unauthorized => (StatusCode::UNAUTHORIZED, "AUTHENTICATION_REQUIRED"),
            BillingError::ValidationFailed { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            BillingError::Infrastructure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = self.0.message();
        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}

/// API error type that converts webhook errors to HTTP responses.
///
/// Any non-200 answer makes the gateway redeliver the notification, so
/// the status codes here directly steer its retry behavior.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        let error_code = match &self.0 {
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::ParseError(_) => "PARSE_ERROR",
            WebhookError::MissingField(_) => "MISSING_FIELD",
            WebhookError::PaymentNotFound => "PAYMENT_NOT_FOUND",
            WebhookError::InvalidTransition(_) => "INVALID_STATE_TRANSITION",
            WebhookError::Database(_) => "INTERNAL_ERROR",
        };

        let body = ErrorResponse::new(error_code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::paytr::MockPaytrGateway;
    use crate::domain::billing::{Payment, Subscription};
    use crate::domain::foundation::{DomainError, OrderId, Timestamp};
    use crate::ports::{SaveResult, WebhookEventRecord};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
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

        fn with_payment(payment: Payment) -> Self {
            Self {
                payments: Mutex::new(vec![payment]),
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
            payment: &Payment,
            _gateway_payload: &serde_json::Value,
        ) -> Result<(), DomainError> {
            let mut payments = self.payments.lock().unwrap();
            if let Some(stored) = payments.iter_mut().find(|p| p.id == payment.id) {
                *stored = payment.clone();
            }
            Ok(())
        }
    }

    struct MockWebhookEventRepository {
        records: Mutex<Vec<WebhookEventRecord>>,
    }

    impl MockWebhookEventRepository {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WebhookEventRepository for MockWebhookEventRepository {
        async fn find_by_event_id(
            &self,
            event_id: &str,
        ) -> Result<Option<WebhookEventRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.event_id == event_id)
                .cloned())
        }

        async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
            let mut records = self.records.lock().unwrap();
            if records.iter().any(|r| r.event_id == record.event_id) {
                return Ok(SaveResult::AlreadyExists);
            }
            records.push(record);
            Ok(SaveResult::Inserted)
        }
    }

    struct MockSubscriptionRepository {
        subscriptions: Mutex<Vec<Subscription>>,
    }

    impl MockSubscriptionRepository {
        fn new() -> Self {
            Self {
                subscriptions: Mutex::new(Vec::new()),
            }
        }

        fn active_for(&self, user_id: &UserId) -> Vec<Subscription> {
            self.subscriptions
                .lock()
                .unwrap()
                .iter()
                .filter(|s| &s.user_id == user_id && s.active)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
        async fn replace_active(&self, subscription: &Subscription) -> Result<(), DomainError> {
            let mut subscriptions = self.subscriptions.lock().unwrap();
            for existing in subscriptions
                .iter_mut()
                .filter(|s| s.user_id == subscription.user_id)
            {
                existing.deactivate();
            }
            subscriptions.push(subscription.clone());
            Ok(())
        }

        async fn find_active_by_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<Subscription>, DomainError> {
            Ok(self
                .subscriptions
                .lock()
                .unwrap()
                .iter()
                .find(|s| &s.user_id == user_id && s.active)
                .cloned())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_verifier() -> Arc<PaytrSignatureVerifier> {
        Arc::new(PaytrSignatureVerifier::new(
            "123456",
            SecretString::new("test_merchant_key".to_string()),
            SecretString::new("test_merchant_salt".to_string()),
        ))
    }

    fn test_user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: test_user_id(),
        }
    }

    fn test_state() -> BillingAppState {
        BillingAppState {
            payments: Arc::new(MockPaymentRepository::new()),
            webhook_events: Arc::new(MockWebhookEventRepository::new()),
            subscriptions: Arc::new(MockSubscriptionRepository::new()),
            gateway: Arc::new(MockPaytrGateway::new()),
            verifier: test_verifier(),
            checkout: CheckoutSettings::default(),
        }
    }

    fn pending_payment(oid: &str) -> Payment {
        Payment::create(
            OrderId::new(oid).unwrap(),
            test_user_id(),
            plan_price(PlanType::Personal, BillingCycle::Monthly),
            "TL".to_string(),
            PlanType::Personal,
            BillingCycle::Monthly,
        )
    }

    fn signed_form(oid: &str, status: &str, amount: &str) -> PaytrWebhookForm {
        let hash = test_verifier().notification_signature(oid, status, amount);
        PaytrWebhookForm {
            merchant_oid: Some(oid.to_string()),
            status: Some(status.to_string()),
            total_amount: Some(amount.to_string()),
            hash: Some(hash),
            failed_reason_code: None,
            failed_reason_msg: None,
            test_mode: None,
            payment_type: None,
            currency: None,
            payment_amount: None,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn initiate_payment_returns_token_response() {
        let state = test_state();
        let request = InitiatePaymentRequest {
            plan_type: "professional".to_string(),
            billing_cycle: "monthly".to_string(),
            user_email: "ada@example.com".to_string(),
            user_name: "Ada Lovelace".to_string(),
            user_phone: None,
        };

        let result =
            initiate_payment(State(state), test_user(), HeaderMap::new(), Json(request)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn initiate_payment_rejects_unknown_plan_with_400() {
        let state = test_state();
        let request = InitiatePaymentRequest {
            plan_type: "platinum".to_string(),
            billing_cycle: "monthly".to_string(),
            user_email: "ada@example.com".to_string(),
            user_name: "Ada Lovelace".to_string(),
            user_phone: None,
        };

        let err = initiate_payment(State(state), test_user(), HeaderMap::new(), Json(request))
            .await
            .err()
            .unwrap();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_plans_returns_six_entries() {
        let response = get_plans(State(test_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_success_returns_ok_and_transitions_subscription() {
        let payments = Arc::new(MockPaymentRepository::with_payment(pending_payment("RVok1")));
        let subscriptions = Arc::new(MockSubscriptionRepository::new());
        let state = BillingAppState {
            payments,
            subscriptions: subscriptions.clone(),
            ..test_state()
        };

        let result =
            handle_paytr_webhook(State(state), Form(signed_form("RVok1", "1", "3000"))).await;

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(subscriptions.active_for(&test_user_id()).len(), 1);
    }

    #[tokio::test]
    async fn webhook_missing_field_returns_400() {
        let mut form = signed_form("RVmiss", "1", "3000");
        form.total_amount = None;

        let result = handle_paytr_webhook(State(test_state()), Form(form)).await;

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_bad_signature_returns_401() {
        let payments = Arc::new(MockPaymentRepository::with_payment(pending_payment("RVsig")));
        let state = BillingAppState {
            payments,
            ..test_state()
        };
        let mut form = signed_form("RVsig", "1", "3000");
        form.hash = Some("dGFtcGVyZWQ=".to_string());

        let result = handle_paytr_webhook(State(state), Form(form)).await;

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_unknown_order_returns_404() {
        let result = handle_paytr_webhook(
            State(test_state()),
            Form(signed_form("RVunknown", "1", "3000")),
        )
        .await;

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_service_identity() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Client IP Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn client_ip_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "203.0.113.7, 10.0.0.1".parse().unwrap());

        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Real-Ip", "198.51.100.4".parse().unwrap());

        assert_eq!(client_ip(&headers), "198.51.100.4");
    }

    #[test]
    fn client_ip_defaults_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn api_error_maps_payment_not_found_to_404() {
        let err = BillingApiError(BillingError::payment_not_found(
            OrderId::new("RVgone").unwrap(),
        ));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_duplicate_order_to_409() {
        let err = BillingApiError(BillingError::duplicate_order(OrderId::new("RVdup").unwrap()));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_invalid_plan_to_400() {
        let err = BillingApiError(BillingError::invalid_plan_type("platinum"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_invalid_cycle_to_400() {
        let err = BillingApiError(BillingError::invalid_billing_cycle("weekly"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_gateway_failure_to_500() {
        let err = BillingApiError(BillingError::gateway_failed("timeout", true));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_maps_unauthorized_to_401() {
        let err = BillingApiError(BillingError::Unauthorized);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn api_error_maps_validation_failure_to_400() {
        let err = BillingApiError(BillingError::validation("userEmail", "Email is required"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn webhook_error_maps_invalid_signature_to_401() {
        let err = WebhookApiError(WebhookError::InvalidSignature);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn webhook_error_maps_missing_field_to_400() {
        let err = WebhookApiError(WebhookError::MissingField("hash"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn webhook_error_maps_database_failure_to_500() {
        let err = WebhookApiError(WebhookError::Database("connection lost".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
