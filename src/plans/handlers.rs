use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::{AccountType, AuthUser, SessionUser};
use crate::error::{AppError, AppResult};
use crate::plans::dto::PlanRequest;
use crate::plans::repo::{self, NewPlan, Plan, PlanWithTrainer};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_active).post(create_plan))
        .route("/plans/mine", get(my_plans))
        .route(
            "/plans/:id",
            get(plan_detail).put(update_plan).delete(delete_plan),
        )
}

fn require_trainer(session: &SessionUser) -> AppResult<()> {
    if session.account_type != AccountType::Trainer {
        warn!(user_id = %session.id, "non-trainer attempted plan mutation");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn validate(payload: &PlanRequest) -> AppResult<()> {
    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".into()));
    }
    if payload.price < 0.0 {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    if payload.duration_days < 1 {
        return Err(AppError::Validation("Duration must be at least one day".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
async fn create_plan(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<PlanRequest>,
) -> AppResult<(StatusCode, Json<Plan>)> {
    require_trainer(&session)?;
    validate(&payload)?;

    let plan = repo::create(
        &state.db,
        session.id,
        NewPlan {
            title: payload.title.trim(),
            description: &payload.description,
            price: payload.price,
            duration_days: payload.duration_days,
            difficulty: &payload.difficulty,
            category: &payload.category,
        },
    )
    .await?;

    info!(plan_id = %plan.id, trainer_id = %session.id, "plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state, payload))]
async fn update_plan(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(plan_id): Path<i64>,
    Json(payload): Json<PlanRequest>,
) -> AppResult<StatusCode> {
    require_trainer(&session)?;
    validate(&payload)?;

    let updated = repo::update(
        &state.db,
        plan_id,
        session.id,
        NewPlan {
            title: payload.title.trim(),
            description: &payload.description,
            price: payload.price,
            duration_days: payload.duration_days,
            difficulty: &payload.difficulty,
            category: &payload.category,
        },
    )
    .await?;

    if !updated {
        return Err(AppError::PlanNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(plan_id): Path<i64>,
) -> AppResult<StatusCode> {
    require_trainer(&session)?;

    if !repo::delete(&state.db, plan_id, session.id).await? {
        return Err(AppError::PlanNotFound);
    }
    info!(plan_id = %plan_id, trainer_id = %session.id, "plan deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn list_active(
    State(state): State<AppState>,
    AuthUser(_session): AuthUser,
) -> AppResult<Json<Vec<PlanWithTrainer>>> {
    Ok(Json(repo::list_active(&state.db).await?))
}

#[instrument(skip(state))]
async fn my_plans(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> AppResult<Json<Vec<Plan>>> {
    require_trainer(&session)?;
    Ok(Json(repo::list_by_trainer(&state.db, session.id).await?))
}

#[instrument(skip(state))]
async fn plan_detail(
    State(state): State<AppState>,
    AuthUser(_session): AuthUser,
    Path(plan_id): Path<i64>,
) -> AppResult<Json<PlanWithTrainer>> {
    repo::detail(&state.db, plan_id)
        .await?
        .map(Json)
        .ok_or(AppError::PlanNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::create_user;
    use crate::state::test_pool;

    #[tokio::test]
    async fn update_and_delete_are_scoped_to_the_owner() {
        let db = test_pool().await;
        let (bob, _) = create_user(&db, "Bob", "bob@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer bob");
        let (eve, _) = create_user(&db, "Eve", "eve@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer eve");

        let plan = repo::create(
            &db,
            bob.id,
            NewPlan {
                title: "P1",
                description: "desc",
                price: 10.0,
                duration_days: 30,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("create plan");

        // Another trainer cannot touch it.
        let touched = repo::update(
            &db,
            plan.id,
            eve.id,
            NewPlan {
                title: "stolen",
                description: "x",
                price: 1.0,
                duration_days: 1,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("update attempt");
        assert!(!touched);
        assert!(!repo::delete(&db, plan.id, eve.id).await.expect("delete attempt"));

        // The owner can.
        assert!(repo::delete(&db, plan.id, bob.id).await.expect("owner delete"));
        assert!(repo::find(&db, plan.id).await.expect("lookup").is_none());
    }
}
