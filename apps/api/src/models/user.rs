#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `users`. Deliberately not `Serialize`: it carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RevokedTokenRow {
    pub id: i32,
    pub jti: String,
    pub user_id: i32,
    pub revoked_at: DateTime<Utc>,
}
