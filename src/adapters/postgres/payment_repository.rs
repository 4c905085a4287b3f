//! PostgreSQL implementation of PaymentRepository.
//!
//! Provides persistent storage for Payment aggregates using PostgreSQL.

use crate::domain::billing::{BillingCycle, Money, Payment, PaymentStatus, PlanType};
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentId, Timestamp, UserId};
use crate::ports::PaymentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PaymentRepository port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new PostgresPaymentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: String,
    user_id: String,
    amount_kurus: i64,
    currency: String,
    plan: String,
    billing_cycle: String,
    status: String,
    gateway_response: Option<serde_json::Value>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            order_id: OrderId::new(row.order_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid order_id: {}", e))
            })?,
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            amount: Money::from_kurus(row.amount_kurus).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid amount: {}", e))
            })?,
            currency: row.currency,
            plan: parse_plan(&row.plan)?,
            billing_cycle: parse_cycle(&row.billing_cycle)?,
            status: parse_status(&row.status)?,
            gateway_response: row.gateway_response,
            completed_at: row.completed_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_plan(s: &str) -> Result<PlanType, DomainError> {
    match s.to_lowercase().as_str() {
        "personal" => Ok(PlanType::Personal),
        "professional" => Ok(PlanType::Professional),
        "enterprise" => Ok(PlanType::Enterprise),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid plan value: {}", s),
        )),
    }
}

fn parse_cycle(s: &str) -> Result<BillingCycle, DomainError> {
    match s.to_lowercase().as_str() {
        "monthly" => Ok(BillingCycle::Monthly),
        "yearly" => Ok(BillingCycle::Yearly),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid billing_cycle value: {}", s),
        )),
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "completed" => Ok(PaymentStatus::Completed),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn status_to_string(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Completed => "completed",
        PaymentStatus::Failed => "failed",
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, user_id, amount_kurus, currency, plan,
                billing_cycle, status, gateway_response, completed_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.as_str())
        .bind(payment.user_id.as_str())
        .bind(payment.amount.kurus())
        .bind(&payment.currency)
        .bind(payment.plan.as_str())
        .bind(payment.billing_cycle.as_str())
        .bind(status_to_string(&payment.status))
        .bind(&payment.gateway_response)
        .bind(payment.completed_at.map(|t| *t.as_datetime()))
        .bind(payment.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("payments_order_id_key") {
                    return DomainError::new(
                        ErrorCode::PaymentExists,
                        "A payment for this order id already exists",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save payment: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, user_id, amount_kurus, currency, plan,
                   billing_cycle, status, gateway_response, completed_at, created_at
            FROM payments
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment: {}", e),
            )
        })?;

        row.map(Payment::try_from).transpose()
    }

    async fn record_outcome(
        &self,
        payment: &Payment,
        gateway_payload: &serde_json::Value,
    ) -> Result<(), DomainError> {
        // Payloads accumulate as a JSONB array so redeliveries and support
        // investigations see every notification the gateway sent.
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                completed_at = $3,
                gateway_response = COALESCE(gateway_response, '[]'::jsonb)
                    || jsonb_build_array($4::jsonb)
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(status_to_string(&payment.status))
        .bind(payment.completed_at.map(|t| *t.as_datetime()))
        .bind(gateway_payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record payment outcome: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                "Payment not found",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plan_works_for_all_values() {
        assert_eq!(parse_plan("personal").unwrap(), PlanType::Personal);
        assert_eq!(parse_plan("professional").unwrap(), PlanType::Professional);
        assert_eq!(parse_plan("enterprise").unwrap(), PlanType::Enterprise);
        assert_eq!(parse_plan("Personal").unwrap(), PlanType::Personal);
    }

    #[test]
    fn parse_plan_rejects_invalid_values() {
        assert!(parse_plan("platinum").is_err());
        assert!(parse_plan("").is_err());
    }

    #[test]
    fn parse_cycle_works_for_all_values() {
        assert_eq!(parse_cycle("monthly").unwrap(), BillingCycle::Monthly);
        assert_eq!(parse_cycle("yearly").unwrap(), BillingCycle::Yearly);
    }

    #[test]
    fn parse_cycle_rejects_invalid_values() {
        assert!(parse_cycle("weekly").is_err());
    }

    #[test]
    fn parse_status_works_for_all_values() {
        assert_eq!(parse_status("pending").unwrap(), PaymentStatus::Pending);
        assert_eq!(parse_status("completed").unwrap(), PaymentStatus::Completed);
        assert_eq!(parse_status("failed").unwrap(), PaymentStatus::Failed);
    }

    #[test]
    fn parse_status_rejects_invalid_values() {
        assert!(parse_status("refunded").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn roundtrip_status_conversion() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
        ] {
            let s = status_to_string(&status);
            let parsed = parse_status(s).unwrap();
            assert_eq!(status, parsed);
        }
    }
}
