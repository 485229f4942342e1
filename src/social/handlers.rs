use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::social::repo;
use crate::state::AppState;
use crate::trainers::repo::TrainerSummary;

#[derive(Debug, Serialize)]
struct FollowingResponse {
    following: bool,
}

#[derive(Debug, Serialize)]
struct FollowersCountResponse {
    count: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/follows", get(followed_trainers))
        .route(
            "/follows/:trainer_id",
            get(following_status).post(follow).delete(unfollow),
        )
        .route("/trainers/:id/followers/count", get(followers_count))
}

#[instrument(skip(state))]
async fn follow(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(trainer_id): Path<i64>,
) -> AppResult<StatusCode> {
    repo::follow(&state.db, session.id, trainer_id).await?;
    info!(user_id = %session.id, trainer_id = %trainer_id, "followed trainer");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state))]
async fn unfollow(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(trainer_id): Path<i64>,
) -> AppResult<StatusCode> {
    let removed = repo::unfollow(&state.db, session.id, trainer_id).await?;
    // Removing a missing edge is not an error; report it in the status.
    Ok(if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}

#[instrument(skip(state))]
async fn following_status(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(trainer_id): Path<i64>,
) -> AppResult<Json<FollowingResponse>> {
    let following = repo::is_following(&state.db, session.id, trainer_id).await?;
    Ok(Json(FollowingResponse { following }))
}

#[instrument(skip(state))]
async fn followed_trainers(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<Vec<TrainerSummary>>> {
    Ok(Json(repo::followed_trainers(&state.db, session.id).await?))
}

#[instrument(skip(state))]
async fn followers_count(
    State(state): State<AppState>,
    AuthUser(_session): AuthUser,
    Path(trainer_id): Path<i64>,
) -> AppResult<Json<FollowersCountResponse>> {
    let count = repo::followers_count(&state.db, trainer_id).await?;
    Ok(Json(FollowersCountResponse { count }))
}
