use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::plans;
use crate::subscriptions::repo::{self, Subscription};

/// Subscribe a user to a plan. The prior-subscription check comes before
/// the plan lookup, and fires regardless of whether that subscription has
/// lapsed: the (user, plan) pair is unique for all time, so an expired
/// subscription still blocks re-subscribing.
pub async fn subscribe(
    db: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    amount: f64,
) -> AppResult<Subscription> {
    if repo::find_by_user_plan(db, user_id, plan_id).await?.is_some() {
        return Err(AppError::AlreadySubscribed);
    }

    let plan = plans::repo::find(db, plan_id)
        .await?
        .ok_or(AppError::PlanNotFound)?;

    let start_date = OffsetDateTime::now_utc().date();
    let end_date = start_date + Duration::days(plan.duration_days);

    let sub = repo::insert(db, user_id, plan_id, start_date, end_date, amount).await?;
    info!(user_id = %user_id, plan_id = %plan_id, end_date = %end_date, "subscription created");
    Ok(sub)
}

/// Derived activity: the subscription window includes today.
pub async fn is_active(db: &SqlitePool, user_id: i64, plan_id: i64) -> AppResult<bool> {
    repo::is_active(db, user_id, plan_id, OffsetDateTime::now_utc().date()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::create_user;
    use crate::auth::AccountType;
    use crate::plans::repo::NewPlan;
    use crate::state::test_pool;
    use time::Date;

    async fn seed(db: &SqlitePool) -> (i64, i64) {
        let (alice, _) = create_user(db, "Alice", "alice@x.com", "555", "secret1", AccountType::User)
            .await
            .expect("user");
        let (bob, _) = create_user(db, "Bob", "bob@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer");
        let plan = plans::repo::create(
            db,
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
        .expect("plan");
        (alice.id, plan.id)
    }

    #[tokio::test]
    async fn subscribe_sets_window_from_plan_duration() {
        let db = test_pool().await;
        let (alice, plan) = seed(&db).await;

        let sub = subscribe(&db, alice, plan, 10.0).await.expect("subscribe");
        assert_eq!(sub.end_date - sub.start_date, Duration::days(30));
        assert_eq!(sub.amount_paid, 10.0);
        assert_eq!(sub.payment_status, "completed");
        assert!(is_active(&db, alice, plan).await.expect("is_active"));
    }

    #[tokio::test]
    async fn second_subscribe_is_rejected() {
        let db = test_pool().await;
        let (alice, plan) = seed(&db).await;

        subscribe(&db, alice, plan, 10.0).await.expect("first");
        let err = subscribe(&db, alice, plan, 10.0).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadySubscribed));
    }

    #[tokio::test]
    async fn lapsed_subscription_still_blocks_resubscribe() {
        let db = test_pool().await;
        let (alice, plan) = seed(&db).await;

        // A subscription that ended last month.
        let today = OffsetDateTime::now_utc().date();
        repo::insert(&db, alice, plan, today - Duration::days(60), today - Duration::days(30), 10.0)
            .await
            .expect("backdated insert");

        assert!(!is_active(&db, alice, plan).await.expect("is_active"));
        let err = subscribe(&db, alice, plan, 10.0).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadySubscribed));
    }

    #[tokio::test]
    async fn missing_plan_is_reported_after_duplicate_check() {
        let db = test_pool().await;
        let (alice, _) = seed(&db).await;

        let err = subscribe(&db, alice, 9999, 10.0).await.unwrap_err();
        assert!(matches!(err, AppError::PlanNotFound));
    }

    #[tokio::test]
    async fn is_active_matches_end_date_boundary() {
        let db = test_pool().await;
        let (alice, plan) = seed(&db).await;
        let today = OffsetDateTime::now_utc().date();

        // Ends today: still active.
        repo::insert(&db, alice, plan, today - Duration::days(30), today, 10.0)
            .await
            .expect("insert");
        assert!(is_active(&db, alice, plan).await.expect("is_active"));
    }

    #[tokio::test]
    async fn never_subscribed_is_not_active() {
        let db = test_pool().await;
        let (alice, plan) = seed(&db).await;
        assert!(!is_active(&db, alice, plan).await.expect("is_active"));
    }

    #[tokio::test]
    async fn listing_returns_newest_first_with_plan_info() {
        let db = test_pool().await;
        let (alice, plan) = seed(&db).await;
        let today = OffsetDateTime::now_utc().date();

        let (bob2, _) = create_user(&db, "Cara", "cara@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer");
        let plan2 = plans::repo::create(
            &db,
            bob2.id,
            NewPlan {
                title: "P2",
                description: "d",
                price: 5.0,
                duration_days: 7,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("plan2");

        repo::insert(&db, alice, plan, today, today + Duration::days(30), 10.0)
            .await
            .expect("first");
        repo::insert(&db, alice, plan2.id, today, today + Duration::days(7), 5.0)
            .await
            .expect("second");

        let subs = repo::list_for_user(&db, alice).await.expect("list");
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].title, "P2");
        assert_eq!(subs[0].trainer_name, "Cara");
        assert_eq!(subs[1].title, "P1");
    }

    #[test]
    fn date_arithmetic_is_calendar_based() {
        let d = Date::from_calendar_date(2026, time::Month::January, 31).expect("date");
        assert_eq!(
            d + Duration::days(1),
            Date::from_calendar_date(2026, time::Month::February, 1).expect("date")
        );
    }
}
