use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::{AccountType, AuthUser};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::trainers::repo::{self, TrainerSummary};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub specialization: String,
    pub experience_years: i64,
    pub bio: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trainers", get(list_trainers))
        .route("/trainers/me", put(update_my_profile))
        .route("/trainers/:id", get(trainer_detail))
}

#[instrument(skip(state))]
async fn list_trainers(
    State(state): State<AppState>,
    AuthUser(_session): AuthUser,
) -> AppResult<Json<Vec<TrainerSummary>>> {
    Ok(Json(repo::list_all(&state.db).await?))
}

#[instrument(skip(state))]
async fn trainer_detail(
    State(state): State<AppState>,
    AuthUser(_session): AuthUser,
    Path(trainer_id): Path<i64>,
) -> AppResult<Json<TrainerSummary>> {
    repo::find(&state.db, trainer_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Trainer"))
}

#[instrument(skip(state, payload))]
async fn update_my_profile(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<StatusCode> {
    if session.account_type != AccountType::Trainer {
        return Err(AppError::Forbidden);
    }
    if payload.experience_years < 0 {
        return Err(AppError::Validation("Experience must not be negative".into()));
    }

    let updated = repo::update_profile(
        &state.db,
        session.id,
        payload.specialization.trim(),
        payload.experience_years,
        payload.bio.trim(),
    )
    .await?;
    if !updated {
        return Err(AppError::NotFound("Trainer profile"));
    }

    info!(user_id = %session.id, "trainer profile updated");
    Ok(StatusCode::NO_CONTENT)
}
