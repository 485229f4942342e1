use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::auth::AccountType;
use crate::error::AppResult;

/// A message is immutable once created, except for the read flag, which
/// only ever moves false to true.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

/// Message with the sender's display name, as rendered in a conversation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConversationMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
    pub sender_name: String,
}

/// A user this user has exchanged at least one message with. Derived from
/// the message log, not stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
}

pub async fn send(
    db: &SqlitePool,
    sender_id: i64,
    receiver_id: i64,
    body: &str,
) -> AppResult<Message> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (sender_id, receiver_id, body, is_read, created_at)
        VALUES (?, ?, ?, 0, ?)
        RETURNING id, sender_id, receiver_id, body, is_read, created_at
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(body)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await?;
    Ok(message)
}

/// All messages between the two users, either direction, oldest first.
/// Symmetric in its arguments.
pub async fn conversation(
    db: &SqlitePool,
    user_a: i64,
    user_b: i64,
) -> AppResult<Vec<ConversationMessage>> {
    let messages = sqlx::query_as::<_, ConversationMessage>(
        r#"
        SELECT m.id, m.sender_id, m.receiver_id, m.body, m.is_read,
               m.created_at, u.name AS sender_name
          FROM messages m
          JOIN users u ON u.id = m.sender_id
         WHERE (m.sender_id = ? AND m.receiver_id = ?)
            OR (m.sender_id = ? AND m.receiver_id = ?)
         ORDER BY m.created_at ASC, m.id ASC
        "#,
    )
    .bind(user_a)
    .bind(user_b)
    .bind(user_b)
    .bind(user_a)
    .fetch_all(db)
    .await?;
    Ok(messages)
}

pub async fn contacts(db: &SqlitePool, user_id: i64) -> AppResult<Vec<Contact>> {
    let contacts = sqlx::query_as::<_, Contact>(
        r#"
        SELECT DISTINCT
               CASE WHEN m.sender_id = ? THEN m.receiver_id ELSE m.sender_id END AS id,
               u.name, u.account_type
          FROM messages m
          JOIN users u
            ON u.id = CASE WHEN m.sender_id = ? THEN m.receiver_id ELSE m.sender_id END
         WHERE m.sender_id = ? OR m.receiver_id = ?
         ORDER BY u.name ASC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(contacts)
}

pub async fn unread_count(db: &SqlitePool, user_id: i64) -> AppResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE receiver_id = ? AND is_read = 0")
            .bind(user_id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

/// Mark everything from the counterparty to this user as read. Idempotent.
pub async fn mark_read(db: &SqlitePool, user_id: i64, counterparty_id: i64) -> AppResult<()> {
    sqlx::query("UPDATE messages SET is_read = 1 WHERE receiver_id = ? AND sender_id = ?")
        .bind(user_id)
        .bind(counterparty_id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::create_user;
    use crate::state::test_pool;

    async fn seed(db: &SqlitePool) -> (i64, i64) {
        let (alice, _) = create_user(db, "Alice", "alice@x.com", "555", "secret1", AccountType::User)
            .await
            .expect("user");
        let (bob, _) = create_user(db, "Bob", "bob@x.com", "555", "secret1", AccountType::Trainer)
            .await
            .expect("trainer");
        (alice.id, bob.id)
    }

    #[tokio::test]
    async fn conversation_is_ordered_and_symmetric() {
        let db = test_pool().await;
        let (alice, bob) = seed(&db).await;

        send(&db, alice, bob, "hi bob").await.expect("send");
        send(&db, bob, alice, "hi alice").await.expect("send");
        send(&db, alice, bob, "how's training?").await.expect("send");

        let from_alice = conversation(&db, alice, bob).await.expect("conv");
        let from_bob = conversation(&db, bob, alice).await.expect("conv");

        assert_eq!(from_alice.len(), 3);
        let ids_a: Vec<i64> = from_alice.iter().map(|m| m.id).collect();
        let ids_b: Vec<i64> = from_bob.iter().map(|m| m.id).collect();
        assert_eq!(ids_a, ids_b);

        assert_eq!(from_alice[0].body, "hi bob");
        assert_eq!(from_alice[0].sender_name, "Alice");
        assert_eq!(from_alice[1].sender_name, "Bob");
        assert_eq!(from_alice[2].body, "how's training?");
    }

    #[tokio::test]
    async fn unread_count_and_mark_read_are_idempotent() {
        let db = test_pool().await;
        let (alice, bob) = seed(&db).await;

        send(&db, bob, alice, "one").await.expect("send");
        send(&db, bob, alice, "two").await.expect("send");
        send(&db, alice, bob, "reply").await.expect("send");

        assert_eq!(unread_count(&db, alice).await.expect("count"), 2);
        assert_eq!(unread_count(&db, bob).await.expect("count"), 1);

        mark_read(&db, alice, bob).await.expect("mark");
        assert_eq!(unread_count(&db, alice).await.expect("count"), 0);
        // Second call changes nothing.
        mark_read(&db, alice, bob).await.expect("mark again");
        assert_eq!(unread_count(&db, alice).await.expect("count"), 0);

        // Bob's unread message from Alice is untouched.
        assert_eq!(unread_count(&db, bob).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn read_flag_never_reverts() {
        let db = test_pool().await;
        let (alice, bob) = seed(&db).await;

        send(&db, bob, alice, "hello").await.expect("send");
        mark_read(&db, alice, bob).await.expect("mark");

        let conv = conversation(&db, alice, bob).await.expect("conv");
        assert!(conv[0].is_read);

        // Later traffic in the other direction does not clear it.
        send(&db, alice, bob, "reply").await.expect("send");
        let conv = conversation(&db, alice, bob).await.expect("conv");
        assert!(conv[0].is_read);
    }

    #[tokio::test]
    async fn contacts_are_distinct_counterparties() {
        let db = test_pool().await;
        let (alice, bob) = seed(&db).await;
        let (cara, _) = create_user(&db, "Cara", "cara@x.com", "555", "secret1", AccountType::User)
            .await
            .expect("user");

        send(&db, alice, bob, "a").await.expect("send");
        send(&db, bob, alice, "b").await.expect("send");
        send(&db, cara.id, alice, "c").await.expect("send");

        let list = contacts(&db, alice).await.expect("contacts");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Bob");
        assert_eq!(list[0].account_type, AccountType::Trainer);
        assert_eq!(list[1].name, "Cara");
        assert_eq!(list[1].account_type, AccountType::User);
    }
}
