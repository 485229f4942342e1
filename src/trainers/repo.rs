use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::AppResult;

/// Trainer as listed in the directory: the user row joined with the 1:1
/// profile extension. Profile fields are nullable until the trainer fills
/// them in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrainerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub experience_years: Option<i64>,
    pub bio: Option<String>,
}

const TRAINER_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, t.specialization, t.experience_years, t.bio
      FROM users u
      LEFT JOIN trainer_profiles t ON t.user_id = u.id
     WHERE u.account_type = 'trainer'
"#;

pub async fn list_all(db: &SqlitePool) -> AppResult<Vec<TrainerSummary>> {
    let trainers = sqlx::query_as::<_, TrainerSummary>(&format!(
        "{TRAINER_SELECT} ORDER BY u.name ASC"
    ))
    .fetch_all(db)
    .await?;
    Ok(trainers)
}

pub async fn find(db: &SqlitePool, trainer_id: i64) -> AppResult<Option<TrainerSummary>> {
    let trainer = sqlx::query_as::<_, TrainerSummary>(&format!(
        "{TRAINER_SELECT} AND u.id = ?"
    ))
    .bind(trainer_id)
    .fetch_optional(db)
    .await?;
    Ok(trainer)
}

/// Owner-only profile update; returns false when the user has no profile
/// row (not a trainer).
pub async fn update_profile(
    db: &SqlitePool,
    user_id: i64,
    specialization: &str,
    experience_years: i64,
    bio: &str,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE trainer_profiles
           SET specialization = ?, experience_years = ?, bio = ?
         WHERE user_id = ?
        "#,
    )
    .bind(specialization)
    .bind(experience_years)
    .bind(bio)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
