//! HandlePaymentWebhookHandler - Command handler for processing gateway notifications.

use std::sync::Arc;

use crate::domain::billing::{
    Payment, PaytrNotification, PaytrSignatureVerifier, Subscription, WebhookError,
};
use crate::domain::foundation::{OrderId, Timestamp};
use crate::ports::{
    PaymentRepository, SaveResult, SubscriptionRepository, WebhookEventRecord,
    WebhookEventRepository,
};

/// Command to process one gateway notification.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Parsed form payload as delivered by the gateway.
    pub notification: PaytrNotification,
}

/// Result of webhook processing.
///
/// Every variant is acknowledged to the gateway with `OK`/200; the
/// distinctions exist for logging and tests.
#[derive(Debug, Clone)]
pub enum HandlePaymentWebhookResult {
    /// Payment completed and the subscription transitioned.
    Completed {
        order_id: String,
        user_id: String,
        subscription_id: String,
    },
    /// Payment recorded as failed; no subscription change.
    MarkedFailed { order_id: String },
    /// Duplicate delivery or already-settled order; no side effects.
    AlreadyProcessed { order_id: String },
    /// Payment completed and recorded, but the subscription transition
    /// failed. Needs operator attention; retrying the webhook cannot fix it.
    SubscriptionTransitionFailed { order_id: String, user_id: String },
}

/// Handler for processing gateway payment notifications.
///
/// Runs the settlement workflow in strict order: verify signature, locate
/// the payment, claim the idempotency ledger row, record the outcome, and
/// on success transition the user's subscription.
pub struct HandlePaymentWebhookHandler {
    payments: Arc<dyn PaymentRepository>,
    events: Arc<dyn WebhookEventRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    verifier: Arc<PaytrSignatureVerifier>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        events: Arc<dyn WebhookEventRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        verifier: Arc<PaytrSignatureVerifier>,
    ) -> Self {
        Self {
            payments,
            events,
            subscriptions,
            verifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let notification = &cmd.notification;

        // 1. Verify the signature before anything else touches state
        self.verifier.verify(notification).map_err(|e| {
            if matches!(e, WebhookError::InvalidSignature) {
                tracing::warn!(
                    merchant_oid = %notification.merchant_oid,
                    status = %notification.status,
                    "Webhook signature verification failed"
                );
            }
            e
        })?;

        // 2. Locate the payment this notification settles
        let order_id = OrderId::new(notification.merchant_oid.clone())
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let mut payment = self
            .payments
            .find_by_order_id(&order_id)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?
            .ok_or(WebhookError::PaymentNotFound)?;

        // 3. Claim the idempotency ledger row
        let record = WebhookEventRecord::from_notification(notification);
        let event_id = record.event_id.clone();
        match self.events.save(record).await {
            Ok(SaveResult::Inserted) => {}
            Ok(SaveResult::AlreadyExists) => {
                tracing::info!(
                    event_id = %event_id,
                    merchant_oid = %notification.merchant_oid,
                    "Duplicate webhook delivery acknowledged"
                );
                return Ok(HandlePaymentWebhookResult::AlreadyProcessed {
                    order_id: order_id.to_string(),
                });
            }
            Err(e) => {
                // An audit-trail miss must not block the payment from
                // being recorded.
                tracing::warn!(
                    event_id = %event_id,
                    error = %e,
                    "Webhook ledger insert failed, continuing settlement"
                );
            }
        }

        // 4. The payments table is authoritative: a settled order ignores
        //    late notifications even when their ledger key is new
        if payment.status.is_settled() {
            tracing::info!(
                merchant_oid = %notification.merchant_oid,
                status = ?payment.status,
                "Notification for already-settled order acknowledged"
            );
            return Ok(HandlePaymentWebhookResult::AlreadyProcessed {
                order_id: order_id.to_string(),
            });
        }

        // 5. Record the outcome
        let payload = notification.payload_json();

        if notification.is_success() {
            let completed_at = Timestamp::now();
            payment
                .complete(completed_at)
                .map_err(|e| WebhookError::InvalidTransition(e.to_string()))?;
            self.payments
                .record_outcome(&payment, &payload)
                .await
                .map_err(|e| WebhookError::Database(e.to_string()))?;

            // 6. Grant the entitlement period
            self.transition_subscription(&payment, completed_at).await
        } else {
            payment
                .fail()
                .map_err(|e| WebhookError::InvalidTransition(e.to_string()))?;
            self.payments
                .record_outcome(&payment, &payload)
                .await
                .map_err(|e| WebhookError::Database(e.to_string()))?;

            tracing::info!(
                merchant_oid = %notification.merchant_oid,
                failed_reason_code = notification.failed_reason_code.as_deref().unwrap_or(""),
                failed_reason_msg = notification.failed_reason_msg.as_deref().unwrap_or(""),
                "Payment marked failed"
            );
            Ok(HandlePaymentWebhookResult::MarkedFailed {
                order_id: order_id.to_string(),
            })
        }
    }

    /// Replaces the user's active subscription after a completed payment.
    ///
    /// Failure here is reported out-of-band instead of bubbling up: the
    /// payment is already recorded, so a gateway retry would be rejected
    /// by the ledger and could never repair the subscription.
    async fn transition_subscription(
        &self,
        payment: &Payment,
        starts_at: Timestamp,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let subscription = match Subscription::start(
            payment.user_id.clone(),
            payment.plan,
            payment.billing_cycle,
            payment.id,
            starts_at,
        ) {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::error!(
                    merchant_oid = %payment.order_id,
                    user_id = %payment.user_id,
                    error = %e,
                    "subscription transition failed after completed payment"
                );
                return Ok(HandlePaymentWebhookResult::SubscriptionTransitionFailed {
                    order_id: payment.order_id.to_string(),
                    user_id: payment.user_id.to_string(),
                });
            }
        };

        if let Err(e) = self.subscriptions.replace_active(&subscription).await {
            tracing::error!(
                merchant_oid = %payment.order_id,
                user_id = %payment.user_id,
                error = %e,
                "subscription transition failed after completed payment"
            );
            return Ok(HandlePaymentWebhookResult::SubscriptionTransitionFailed {
                order_id: payment.order_id.to_string(),
                user_id: payment.user_id.to_string(),
            });
        }

        tracing::info!(
            merchant_oid = %payment.order_id,
            user_id = %payment.user_id,
            subscription_id = %subscription.id,
            ends_at = %subscription.ends_at.as_datetime(),
            "Payment completed and subscription activated"
        );

        Ok(HandlePaymentWebhookResult::Completed {
            order_id: payment.order_id.to_string(),
            user_id: payment.user_id.to_string(),
            subscription_id: subscription.id.to_string(),
        })
    }
}
