use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use crate::error::AppResult;

/// Feed entry: an active plan by a followed trainer, annotated with whether
/// the viewer currently holds a live subscription to it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedPlan {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i64,
    pub difficulty: String,
    pub category: String,
    pub trainer_id: i64,
    pub trainer_name: String,
    pub created_at: OffsetDateTime,
    pub is_purchased: bool,
}

/// Pure read-side join across follows, the plan catalog and the
/// subscription ledger. `is_purchased` requires the subscription to be
/// live on `today`, matching `subscriptions::services::is_active`.
pub async fn personalized_feed(
    db: &SqlitePool,
    user_id: i64,
    today: Date,
) -> AppResult<Vec<FeedPlan>> {
    let plans = sqlx::query_as::<_, FeedPlan>(
        r#"
        SELECT p.id, p.title, p.description, p.price, p.duration_days,
               p.difficulty, p.category, u.id AS trainer_id, u.name AS trainer_name,
               p.created_at,
               CASE WHEN s.id IS NOT NULL THEN 1 ELSE 0 END AS is_purchased
          FROM plans p
          JOIN users u ON u.id = p.trainer_id
          JOIN followers f ON f.trainer_id = u.id AND f.user_id = ?
          LEFT JOIN subscriptions s
            ON s.plan_id = p.id AND s.user_id = ? AND s.end_date >= ?
         WHERE p.is_active = 1
         ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(today)
    .fetch_all(db)
    .await?;
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::create_user;
    use crate::auth::AccountType;
    use crate::plans::repo::NewPlan;
    use crate::social;
    use crate::state::test_pool;
    use crate::subscriptions;
    use time::Duration;

    fn today() -> Date {
        OffsetDateTime::now_utc().date()
    }

    #[tokio::test]
    async fn feed_contains_only_active_plans_of_followed_trainers() {
        let db = test_pool().await;
        let (alice, _) = create_user(&db, "Alice", "alice@x.com", "555", "secret1", AccountType::User)
            .await
            .expect("user");
        let (bob, _) = create_user(&db, "Bob", "bob@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer");
        let (cara, _) = create_user(&db, "Cara", "cara@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer");

        let followed_plan = crate::plans::repo::create(
            &db,
            bob.id,
            NewPlan {
                title: "Followed",
                description: "d",
                price: 10.0,
                duration_days: 30,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("plan");
        crate::plans::repo::create(
            &db,
            cara.id,
            NewPlan {
                title: "Unfollowed",
                description: "d",
                price: 10.0,
                duration_days: 30,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("plan");

        social::repo::follow(&db, alice.id, bob.id).await.expect("follow");

        // Deactivated plans stay out of the feed.
        let inactive = crate::plans::repo::create(
            &db,
            bob.id,
            NewPlan {
                title: "Inactive",
                description: "d",
                price: 10.0,
                duration_days: 30,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("plan");
        sqlx::query("UPDATE plans SET is_active = 0 WHERE id = ?")
            .bind(inactive.id)
            .execute(&db)
            .await
            .expect("deactivate");

        let feed = personalized_feed(&db, alice.id, today()).await.expect("feed");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, followed_plan.id);
        assert_eq!(feed[0].trainer_name, "Bob");
        assert!(!feed[0].is_purchased);
    }

    #[tokio::test]
    async fn lapsed_subscription_shows_as_not_purchased() {
        let db = test_pool().await;
        let (alice, _) = create_user(&db, "Alice", "alice@x.com", "555", "secret1", AccountType::User)
            .await
            .expect("user");
        let (bob, _) = create_user(&db, "Bob", "bob@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer");
        let plan = crate::plans::repo::create(
            &db,
            bob.id,
            NewPlan {
                title: "P1",
                description: "d",
                price: 10.0,
                duration_days: 30,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("plan");
        social::repo::follow(&db, alice.id, bob.id).await.expect("follow");

        subscriptions::repo::insert(
            &db,
            alice.id,
            plan.id,
            today() - Duration::days(60),
            today() - Duration::days(30),
            10.0,
        )
        .await
        .expect("lapsed subscription");

        let feed = personalized_feed(&db, alice.id, today()).await.expect("feed");
        assert_eq!(feed.len(), 1);
        assert!(!feed[0].is_purchased);
    }

    /// End to end: signup, follow, publish, feed, subscribe, feed again.
    #[tokio::test]
    async fn purchase_flips_the_feed_flag() {
        let db = test_pool().await;
        let (alice, alice_token) =
            create_user(&db, "Alice", "alice@x.com", "555", "secret1", AccountType::User)
                .await
                .expect("alice");
        crate::auth::services::verify_token(&db, &alice_token)
            .await
            .expect("alice token valid");
        let (bob, _) = create_user(&db, "Bob", "bob@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("bob");

        social::repo::follow(&db, alice.id, bob.id).await.expect("follow");
        let plan = crate::plans::repo::create(
            &db,
            bob.id,
            NewPlan {
                title: "P1",
                description: "d",
                price: 10.0,
                duration_days: 30,
                difficulty: "Beginner",
                category: "General",
            },
        )
        .await
        .expect("plan");

        let feed = personalized_feed(&db, alice.id, today()).await.expect("feed");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].title, "P1");
        assert!(!feed[0].is_purchased);

        subscriptions::services::subscribe(&db, alice.id, plan.id, 10.0)
            .await
            .expect("subscribe");

        let feed = personalized_feed(&db, alice.id, today()).await.expect("feed");
        assert_eq!(feed.len(), 1);
        assert!(feed[0].is_purchased);

        let err = subscriptions::services::subscribe(&db, alice.id, plan.id, 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::AppError::AlreadySubscribed));
    }
}
