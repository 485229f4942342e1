use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::auth::dto::{AuthResponse, LoginRequest, RegisterRequest, SessionUser};
use crate::auth::extractors::AuthUser;
use crate::auth::services::{self, is_valid_email};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/session", get(session))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 6 {
        warn!("password too short");
        return Err(AppError::Validation("Password too short".into()));
    }

    let (user, token) = services::create_user(
        &state.db,
        payload.name.trim(),
        &payload.email,
        payload.mobile.trim(),
        &payload.password,
        payload.account_type,
    )
    .await?;

    Ok(Json(AuthResponse {
        token,
        user: SessionUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let (user, token) = services::verify_credentials(&state.db, &payload.email, &payload.password).await?;
    Ok(Json(AuthResponse { token, user }))
}

/// Re-validates the presented token and returns the session view.
#[instrument(skip_all)]
async fn session(AuthUser(session): AuthUser) -> Json<SessionUser> {
    Json(session)
}
