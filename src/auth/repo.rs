use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountType {
    User,
    Trainer,
}

/// User record in the database. Never hard-deleted.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password_hash: String,
    pub salt: String,
    pub account_type: AccountType,
    pub auth_token: Option<String>,
    pub token_expiry: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub mobile: &'a str,
    pub password_hash: &'a str,
    pub salt: &'a str,
    pub account_type: AccountType,
    pub auth_token: &'a str,
    pub token_expiry: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, name, email, mobile, password_hash, salt, \
     account_type, auth_token, token_expiry, created_at";

/// Insert a user, and for trainers the empty profile row, in one
/// transaction. A duplicate email surfaces from the UNIQUE constraint on
/// the insert itself, so there is no window between check and insert.
pub async fn create_user(db: &SqlitePool, new: NewUser<'_>) -> AppResult<User> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (name, email, mobile, password_hash, salt,
                           account_type, auth_token, token_expiry, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(new.name)
    .bind(new.email)
    .bind(new.mobile)
    .bind(new.password_hash)
    .bind(new.salt)
    .bind(new.account_type)
    .bind(new.auth_token)
    .bind(new.token_expiry)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(&mut *tx)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    if user.account_type == AccountType::Trainer {
        sqlx::query("INSERT INTO trainer_profiles (user_id) VALUES (?)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(user)
}

pub async fn find_by_email(db: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_token(db: &SqlitePool, token: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE auth_token = ?"
    ))
    .bind(token)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Overwrite the stored token and expiry. The previous token stops
/// verifying immediately: one active session per user.
pub async fn rotate_token(
    db: &SqlitePool,
    user_id: i64,
    token: &str,
    expiry: OffsetDateTime,
) -> AppResult<()> {
    sqlx::query("UPDATE users SET auth_token = ?, token_expiry = ? WHERE id = ?")
        .bind(token)
        .bind(expiry)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
