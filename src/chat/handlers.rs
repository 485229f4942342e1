use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::chat::dto::{SendMessageRequest, UnreadCountResponse};
use crate::chat::repo::{self, Contact, ConversationMessage, Message};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(send_message))
        .route("/messages/contacts", get(contacts))
        .route("/messages/unread", get(unread_count))
        .route("/messages/:user_id", get(conversation))
        .route("/messages/:user_id/read", post(mark_read))
}

#[instrument(skip(state, payload))]
async fn send_message(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    if payload.body.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".into()));
    }

    let message = repo::send(&state.db, session.id, payload.receiver_id, &payload.body).await?;
    info!(message_id = %message.id, receiver_id = %payload.receiver_id, "message sent");
    Ok((StatusCode::CREATED, Json(message)))
}

#[instrument(skip(state))]
async fn conversation(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<ConversationMessage>>> {
    Ok(Json(repo::conversation(&state.db, session.id, user_id).await?))
}

#[instrument(skip(state))]
async fn contacts(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<Vec<Contact>>> {
    Ok(Json(repo::contacts(&state.db, session.id).await?))
}

#[instrument(skip(state))]
async fn unread_count(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let count = repo::unread_count(&state.db, session.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

#[instrument(skip(state))]
async fn mark_read(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    repo::mark_read(&state.db, session.id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
