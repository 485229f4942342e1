use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Plan {
    pub id: i64,
    pub trainer_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i64,
    pub difficulty: String,
    pub category: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Plan joined with its author, as shown in catalog listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlanWithTrainer {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i64,
    pub difficulty: String,
    pub category: String,
    pub trainer_id: i64,
    pub trainer_name: String,
    pub created_at: OffsetDateTime,
}

pub struct NewPlan<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub duration_days: i64,
    pub difficulty: &'a str,
    pub category: &'a str,
}

const PLAN_COLUMNS: &str = "id, trainer_id, title, description, price, duration_days, \
     difficulty, category, is_active, created_at, updated_at";

pub async fn create(db: &SqlitePool, trainer_id: i64, new: NewPlan<'_>) -> AppResult<Plan> {
    let now = OffsetDateTime::now_utc();
    let plan = sqlx::query_as::<_, Plan>(&format!(
        r#"
        INSERT INTO plans (trainer_id, title, description, price, duration_days,
                           difficulty, category, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(trainer_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.price)
    .bind(new.duration_days)
    .bind(new.difficulty)
    .bind(new.category)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(plan)
}

/// Update scoped to the owning trainer; returns false when no row matched.
pub async fn update(
    db: &SqlitePool,
    plan_id: i64,
    trainer_id: i64,
    new: NewPlan<'_>,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE plans
           SET title = ?, description = ?, price = ?, duration_days = ?,
               difficulty = ?, category = ?, updated_at = ?
         WHERE id = ? AND trainer_id = ?
        "#,
    )
    .bind(new.title)
    .bind(new.description)
    .bind(new.price)
    .bind(new.duration_days)
    .bind(new.difficulty)
    .bind(new.category)
    .bind(OffsetDateTime::now_utc())
    .bind(plan_id)
    .bind(trainer_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete scoped to the owning trainer; returns false when no row matched.
pub async fn delete(db: &SqlitePool, plan_id: i64, trainer_id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = ? AND trainer_id = ?")
        .bind(plan_id)
        .bind(trainer_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find(db: &SqlitePool, plan_id: i64) -> AppResult<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?"
    ))
    .bind(plan_id)
    .fetch_optional(db)
    .await?;
    Ok(plan)
}

pub async fn list_by_trainer(db: &SqlitePool, trainer_id: i64) -> AppResult<Vec<Plan>> {
    let plans = sqlx::query_as::<_, Plan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM plans WHERE trainer_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(trainer_id)
    .fetch_all(db)
    .await?;
    Ok(plans)
}

/// All active plans with trainer info, newest first.
pub async fn list_active(db: &SqlitePool) -> AppResult<Vec<PlanWithTrainer>> {
    let plans = sqlx::query_as::<_, PlanWithTrainer>(
        r#"
        SELECT p.id, p.title, p.description, p.price, p.duration_days,
               p.difficulty, p.category, u.id AS trainer_id, u.name AS trainer_name,
               p.created_at
          FROM plans p
          JOIN users u ON u.id = p.trainer_id
         WHERE p.is_active = 1
         ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(plans)
}

pub async fn detail(db: &SqlitePool, plan_id: i64) -> AppResult<Option<PlanWithTrainer>> {
    let plan = sqlx::query_as::<_, PlanWithTrainer>(
        r#"
        SELECT p.id, p.title, p.description, p.price, p.duration_days,
               p.difficulty, p.category, u.id AS trainer_id, u.name AS trainer_name,
               p.created_at
          FROM plans p
          JOIN users u ON u.id = p.trainer_id
         WHERE p.id = ?
        "#,
    )
    .bind(plan_id)
    .fetch_optional(db)
    .await?;
    Ok(plan)
}
