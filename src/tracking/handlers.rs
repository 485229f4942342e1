use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use time::Date;
use tracing::instrument;

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::tracking::repo::{self, Goal, NewWorkout, Workout};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts).post(log_workout))
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/:id/progress", put(update_progress))
}

#[derive(Debug, Deserialize)]
struct LogWorkoutRequest {
    workout_name: String,
    duration_minutes: Option<i64>,
    calories_burned: Option<i64>,
    workout_date: Date,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateGoalRequest {
    goal_type: String,
    target_value: Option<f64>,
    deadline: Option<Date>,
}

#[derive(Debug, Deserialize)]
struct UpdateProgressRequest {
    current_value: f64,
}

#[instrument(skip(state, payload), fields(user_id = session.id))]
async fn log_workout(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<LogWorkoutRequest>,
) -> AppResult<Json<Workout>> {
    if payload.workout_name.trim().is_empty() {
        return Err(AppError::Validation("workout name must not be empty".into()));
    }
    let workout = repo::add_workout(
        &state.db,
        session.id,
        NewWorkout {
            workout_name: payload.workout_name.trim(),
            duration_minutes: payload.duration_minutes,
            calories_burned: payload.calories_burned,
            workout_date: payload.workout_date,
            notes: payload.notes.as_deref(),
        },
    )
    .await?;
    tracing::info!(workout_id = workout.id, "workout logged");
    Ok(Json(workout))
}

#[instrument(skip(state))]
async fn list_workouts(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<Vec<Workout>>> {
    Ok(Json(repo::list_workouts(&state.db, session.id).await?))
}

#[instrument(skip(state, payload), fields(user_id = session.id))]
async fn create_goal(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<CreateGoalRequest>,
) -> AppResult<Json<Goal>> {
    if payload.goal_type.trim().is_empty() {
        return Err(AppError::Validation("goal type must not be empty".into()));
    }
    let goal = repo::add_goal(
        &state.db,
        session.id,
        payload.goal_type.trim(),
        payload.target_value,
        payload.deadline,
    )
    .await?;
    Ok(Json(goal))
}

#[instrument(skip(state))]
async fn list_goals(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<Vec<Goal>>> {
    Ok(Json(repo::list_goals(&state.db, session.id).await?))
}

#[instrument(skip(state, payload))]
async fn update_progress(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(goal_id): Path<i64>,
    Json(payload): Json<UpdateProgressRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let updated =
        repo::update_goal_progress(&state.db, goal_id, session.id, payload.current_value).await?;
    if !updated {
        return Err(AppError::NotFound("goal"));
    }
    Ok(Json(serde_json::json!({ "updated": true })))
}
