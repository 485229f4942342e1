use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::subscriptions::dto::{ActiveResponse, SubscribeRequest};
use crate::subscriptions::repo::{self, Subscription, SubscriptionWithPlan};
use crate::subscriptions::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(my_subscriptions).post(subscribe))
        .route("/subscriptions/:plan_id/active", get(subscription_active))
}

#[instrument(skip(state, payload))]
async fn subscribe(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<(StatusCode, Json<Subscription>)> {
    let sub = services::subscribe(&state.db, session.id, payload.plan_id, payload.amount).await?;
    Ok((StatusCode::CREATED, Json(sub)))
}

#[instrument(skip(state))]
async fn my_subscriptions(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<Vec<SubscriptionWithPlan>>> {
    Ok(Json(repo::list_for_user(&state.db, session.id).await?))
}

#[instrument(skip(state))]
async fn subscription_active(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(plan_id): Path<i64>,
) -> AppResult<Json<ActiveResponse>> {
    let active = services::is_active(&state.db, session.id, plan_id).await?;
    Ok(Json(ActiveResponse { active }))
}
