//! PostgreSQL implementation of SubscriptionRepository.
//!
//! The transition onto a new subscription runs as one transaction so the
//! "at most one active subscription per user" invariant holds even if the
//! process dies mid-operation.

use crate::domain::billing::{BillingCycle, PlanType, Subscription};
use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp, UserId,
};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new PostgresSubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: String,
    plan: String,
    billing_cycle: String,
    payment_id: Uuid,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            plan: parse_plan(&row.plan)?,
            billing_cycle: parse_cycle(&row.billing_cycle)?,
            payment_id: PaymentId::from_uuid(row.payment_id),
            starts_at: Timestamp::from_datetime(row.starts_at),
            ends_at: Timestamp::from_datetime(row.ends_at),
            active: row.active,
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

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn replace_active(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin subscription transaction: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            UPDATE subscriptions
            SET active = FALSE
            WHERE user_id = $1 AND active = TRUE
            "#,
        )
        .bind(subscription.user_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to deactivate prior subscriptions: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan, billing_cycle, payment_id,
                starts_at, ends_at, active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_str())
        .bind(subscription.plan.as_str())
        .bind(subscription.billing_cycle.as_str())
        .bind(subscription.payment_id.as_uuid())
        .bind(subscription.starts_at.as_datetime())
        .bind(subscription.ends_at.as_datetime())
        .bind(subscription.active)
        .bind(subscription.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert subscription: {}", e),
            )
        })?;

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit subscription transaction: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan, billing_cycle, payment_id,
                   starts_at, ends_at, active, created_at
            FROM subscriptions
            WHERE user_id = $1 AND active = TRUE
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find active subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }
}
