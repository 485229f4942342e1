use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use crate::error::AppResult;

/// Append-only workout log entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub workout_name: String,
    pub duration_minutes: Option<i64>,
    pub calories_burned: Option<i64>,
    pub workout_date: Date,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub goal_type: String,
    pub target_value: Option<f64>,
    pub current_value: f64,
    pub deadline: Option<Date>,
    pub status: String,
    pub created_at: OffsetDateTime,
}

pub struct NewWorkout<'a> {
    pub workout_name: &'a str,
    pub duration_minutes: Option<i64>,
    pub calories_burned: Option<i64>,
    pub workout_date: Date,
    pub notes: Option<&'a str>,
}

pub async fn add_workout(db: &SqlitePool, user_id: i64, new: NewWorkout<'_>) -> AppResult<Workout> {
    let workout = sqlx::query_as::<_, Workout>(
        r#"
        INSERT INTO workouts (user_id, workout_name, duration_minutes,
                              calories_burned, workout_date, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, workout_name, duration_minutes, calories_burned,
                  workout_date, notes, created_at
        "#,
    )
    .bind(user_id)
    .bind(new.workout_name)
    .bind(new.duration_minutes)
    .bind(new.calories_burned)
    .bind(new.workout_date)
    .bind(new.notes)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await?;
    Ok(workout)
}

pub async fn list_workouts(db: &SqlitePool, user_id: i64) -> AppResult<Vec<Workout>> {
    let workouts = sqlx::query_as::<_, Workout>(
        r#"
        SELECT id, user_id, workout_name, duration_minutes, calories_burned,
               workout_date, notes, created_at
          FROM workouts
         WHERE user_id = ?
         ORDER BY workout_date DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(workouts)
}

pub async fn add_goal(
    db: &SqlitePool,
    user_id: i64,
    goal_type: &str,
    target_value: Option<f64>,
    deadline: Option<Date>,
) -> AppResult<Goal> {
    let goal = sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO goals (user_id, goal_type, target_value, current_value,
                           deadline, status, created_at)
        VALUES (?, ?, ?, 0, ?, 'active', ?)
        RETURNING id, user_id, goal_type, target_value, current_value,
                  deadline, status, created_at
        "#,
    )
    .bind(user_id)
    .bind(goal_type)
    .bind(target_value)
    .bind(deadline)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await?;
    Ok(goal)
}

pub async fn list_goals(db: &SqlitePool, user_id: i64) -> AppResult<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(
        r#"
        SELECT id, user_id, goal_type, target_value, current_value,
               deadline, status, created_at
          FROM goals
         WHERE user_id = ?
         ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(goals)
}

/// Progress update scoped to the goal's owner; returns false when no row
/// matched.
pub async fn update_goal_progress(
    db: &SqlitePool,
    goal_id: i64,
    user_id: i64,
    current_value: f64,
) -> AppResult<bool> {
    let result = sqlx::query("UPDATE goals SET current_value = ? WHERE id = ? AND user_id = ?")
        .bind(current_value)
        .bind(goal_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
