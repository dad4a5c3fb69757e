use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::TokenService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Signs and verifies bearer tokens; built once from `config.jwt_secret`.
    pub tokens: Arc<TokenService>,
}
