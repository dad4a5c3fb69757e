//! Queries over `users` and `revoked_tokens`.
//!
//! Every function takes the caller's connection so a handler can run several
//! of them inside one transaction.

use sqlx::PgConnection;

use crate::errors::AppError;
use crate::models::user::{RevokedTokenRow, UserRow};

pub async fn find_user_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await
}

/// Resolves the account behind a token subject, or 404.
pub async fn require_user(conn: &mut PgConnection, email: &str) -> Result<UserRow, AppError> {
    find_user_by_email(conn, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn insert_user(
    conn: &mut PgConnection,
    email: &str,
    password_hash: &str,
) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING *",
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(conn)
    .await
}

pub async fn update_password(
    conn: &mut PgConnection,
    user_id: i32,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_user(conn: &mut PgConnection, user_id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn is_revoked(conn: &mut PgConnection, jti: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
        .bind(jti)
        .fetch_one(conn)
        .await
}

/// Adds `jti` to the denylist. The unique constraint on `jti` rejects a
/// second insert of the same id.
pub async fn revoke(
    conn: &mut PgConnection,
    jti: &str,
    user_id: i32,
) -> Result<RevokedTokenRow, sqlx::Error> {
    sqlx::query_as::<_, RevokedTokenRow>(
        "INSERT INTO revoked_tokens (jti, user_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(jti)
    .bind(user_id)
    .fetch_one(conn)
    .await
}

pub async fn delete_revoked_for_user(
    conn: &mut PgConnection,
    user_id: i32,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM revoked_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
