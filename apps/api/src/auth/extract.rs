//! Bearer-token extractors.
//!
//! `BearerClaims` only checks signature and expiry; `AuthUser` additionally
//! rejects denylisted tokens and is what protected handlers take.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use super::jwt::Claims;
use super::store;
use crate::errors::AppError;
use crate::state::AppState;

/// Verified claims of the presented token, revoked or not.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

/// The authenticated caller of a protected route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub jti: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for BearerClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token).map_err(|e| {
            debug!("JWT validation failed: {e:#}");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;
        Ok(BearerClaims(claims))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let BearerClaims(claims) = BearerClaims::from_request_parts(parts, state).await?;

        let mut conn = state.db.acquire().await?;
        if store::is_revoked(&mut *conn, &claims.jti).await? {
            debug!("Rejected revoked token {}", claims.jti);
            return Err(AppError::Unauthorized(
                "Token has been revoked".to_string(),
            ));
        }

        Ok(AuthUser {
            email: claims.sub,
            jti: claims.jti,
        })
    }
}
