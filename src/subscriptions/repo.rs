use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use crate::error::{AppError, AppResult};

/// Subscription row. Insert-only: never mutated or deleted after creation.
/// Whether it is "active" is derived from `end_date`, never stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub payment_status: String,
    pub amount_paid: f64,
    pub created_at: OffsetDateTime,
}

/// Subscription joined with plan and trainer, for the user's own listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubscriptionWithPlan {
    pub id: i64,
    pub plan_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i64,
    pub trainer_name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub amount_paid: f64,
}

const SUB_COLUMNS: &str =
    "id, user_id, plan_id, start_date, end_date, payment_status, amount_paid, created_at";

pub async fn find_by_user_plan(
    db: &SqlitePool,
    user_id: i64,
    plan_id: i64,
) -> AppResult<Option<Subscription>> {
    let sub = sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {SUB_COLUMNS} FROM subscriptions WHERE user_id = ? AND plan_id = ?"
    ))
    .bind(user_id)
    .bind(plan_id)
    .fetch_optional(db)
    .await?;
    Ok(sub)
}

/// Insert the one allowed row per (user, plan). The UNIQUE constraint
/// backstops the caller's existence check under concurrent requests.
pub async fn insert(
    db: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    start_date: Date,
    end_date: Date,
    amount: f64,
) -> AppResult<Subscription> {
    let inserted = sqlx::query_as::<_, Subscription>(&format!(
        r#"
        INSERT INTO subscriptions (user_id, plan_id, start_date, end_date,
                                   payment_status, amount_paid, created_at)
        VALUES (?, ?, ?, ?, 'completed', ?, ?)
        RETURNING {SUB_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(plan_id)
    .bind(start_date)
    .bind(end_date)
    .bind(amount)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await;

    match inserted {
        Ok(sub) => Ok(sub),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AppError::AlreadySubscribed)
        }
        Err(e) => Err(e.into()),
    }
}

/// True iff the unique (user, plan) row exists and has not lapsed.
pub async fn is_active(
    db: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    today: Date,
) -> AppResult<bool> {
    let active: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM subscriptions
             WHERE user_id = ? AND plan_id = ? AND end_date >= ?
        )
        "#,
    )
    .bind(user_id)
    .bind(plan_id)
    .bind(today)
    .fetch_one(db)
    .await?;
    Ok(active)
}

pub async fn list_for_user(db: &SqlitePool, user_id: i64) -> AppResult<Vec<SubscriptionWithPlan>> {
    let subs = sqlx::query_as::<_, SubscriptionWithPlan>(
        r#"
        SELECT s.id, p.id AS plan_id, p.title, p.description, p.price,
               p.duration_days, u.name AS trainer_name,
               s.start_date, s.end_date, s.amount_paid
          FROM subscriptions s
          JOIN plans p ON p.id = s.plan_id
          JOIN users u ON u.id = p.trainer_id
         WHERE s.user_id = ?
         ORDER BY s.created_at DESC, s.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(subs)
}
