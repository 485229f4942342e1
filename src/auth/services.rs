use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::auth::dto::SessionUser;
use crate::auth::repo::{self, AccountType, NewUser, User};
use crate::auth::token;
use crate::error::{AppError, AppResult};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create an account with a fresh salt, digest and session token. For
/// trainers the profile row is created in the same transaction.
pub async fn create_user(
    db: &SqlitePool,
    name: &str,
    email: &str,
    mobile: &str,
    password: &str,
    account_type: AccountType,
) -> AppResult<(User, String)> {
    let salt = token::generate_salt();
    let password_hash = token::hash_password(password, &salt);
    let auth_token = token::generate_token();

    let user = repo::create_user(
        db,
        NewUser {
            name,
            email,
            mobile,
            password_hash: &password_hash,
            salt: &salt,
            account_type,
            auth_token: &auth_token,
            token_expiry: token::token_expiry(),
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, account_type = ?account_type, "user created");
    Ok((user, auth_token))
}

/// Check email and password, and on success rotate the session token.
/// Logging in from anywhere silently revokes the previous session.
pub async fn verify_credentials(
    db: &SqlitePool,
    email: &str,
    password: &str,
) -> AppResult<(SessionUser, String)> {
    let user = repo::find_by_email(db, email).await?.ok_or_else(|| {
        warn!(email = %email, "login unknown email");
        AppError::InvalidCredentials
    })?;

    let computed = token::hash_password(password, &user.salt);
    if !token::hashes_match(&computed, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let new_token = token::generate_token();
    repo::rotate_token(db, user.id, &new_token, token::token_expiry()).await?;

    info!(user_id = %user.id, "user logged in");
    Ok((SessionUser::from(&user), new_token))
}

/// A token verifies iff it is the user's current token and its expiry is
/// still in the future. No sliding window: verification never extends it.
pub async fn verify_token(db: &SqlitePool, token: &str) -> AppResult<SessionUser> {
    let user = repo::find_by_token(db, token)
        .await?
        .ok_or(AppError::InvalidToken)?;

    match user.token_expiry {
        Some(expiry) if expiry > OffsetDateTime::now_utc() => {
            debug!(user_id = %user.id, "token verified");
            Ok(SessionUser::from(&user))
        }
        _ => {
            warn!(user_id = %user.id, "expired token rejected");
            Err(AppError::InvalidToken)
        }
    }
}
