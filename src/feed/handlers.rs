use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::feed::repo::{self, FeedPlan};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/feed", get(personalized_feed))
}

#[instrument(skip(state))]
async fn personalized_feed(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<Vec<FeedPlan>>> {
    let today = OffsetDateTime::now_utc().date();
    Ok(Json(repo::personalized_feed(&state.db, session.id, today).await?))
}
