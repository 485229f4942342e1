use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::trainers::repo::TrainerSummary;

/// Create the directed follow edge. Uniqueness per (user, trainer) pair is
/// the store's constraint; a duplicate insert surfaces as AlreadyFollowing.
/// Nothing stops a user from following themselves; the original behavior
/// is permissive and is kept that way.
pub async fn follow(db: &SqlitePool, user_id: i64, trainer_id: i64) -> AppResult<()> {
    let inserted = sqlx::query(
        "INSERT INTO followers (user_id, trainer_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(trainer_id)
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await;

    match inserted {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AppError::AlreadyFollowing)
        }
        Err(e) => Err(e.into()),
    }
}

/// Hard delete of the edge; true iff a row existed. Absence is a false
/// result, not an error.
pub async fn unfollow(db: &SqlitePool, user_id: i64, trainer_id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM followers WHERE user_id = ? AND trainer_id = ?")
        .bind(user_id)
        .bind(trainer_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_following(db: &SqlitePool, user_id: i64, trainer_id: i64) -> AppResult<bool> {
    let following: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM followers WHERE user_id = ? AND trainer_id = ?)",
    )
    .bind(user_id)
    .bind(trainer_id)
    .fetch_one(db)
    .await?;
    Ok(following)
}

/// Recomputed on demand; no cached counter.
pub async fn followers_count(db: &SqlitePool, trainer_id: i64) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM followers WHERE trainer_id = ?")
        .bind(trainer_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Trainers the user follows, with their profile fields.
pub async fn followed_trainers(db: &SqlitePool, user_id: i64) -> AppResult<Vec<TrainerSummary>> {
    let trainers = sqlx::query_as::<_, TrainerSummary>(
        r#"
        SELECT u.id, u.name, u.email, t.specialization, t.experience_years, t.bio
          FROM followers f
          JOIN users u ON u.id = f.trainer_id
          LEFT JOIN trainer_profiles t ON t.user_id = u.id
         WHERE f.user_id = ?
         ORDER BY u.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(trainers)
}
