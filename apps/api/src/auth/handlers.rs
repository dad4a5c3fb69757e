use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::extract::{AuthUser, BearerClaims};
use super::password::{
    hash_password_blocking, verify_decoy_blocking, verify_password_blocking,
};
use super::store;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::message::MessageResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AppError::Validation(
                "Email, password, and confirm password are required".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(AppError::Validation(
                "Password and confirm password do not match".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ForgotPasswordRequest {
    /// Checked after the account lookup, so an unknown email is a 404 first.
    pub fn validate_passwords(&self) -> Result<(), AppError> {
        if self.new_password.is_empty() || self.confirm_password.is_empty() {
            return Err(AppError::Validation(
                "New password and confirm password are required".to_string(),
            ));
        }
        if self.new_password != self.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        Ok(())
    }
}

fn duplicate_email() -> AppError {
    AppError::Validation("Email already exists".to_string())
}

/// POST /register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    if store::find_user_by_email(&mut *tx, &req.email)
        .await?
        .is_some()
    {
        return Err(duplicate_email());
    }

    let hash = hash_password_blocking(req.password).await?;
    let user = store::insert_user(&mut *tx, &req.email, &hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_email()
            } else {
                e.into()
            }
        })?;

    tx.commit().await?;
    info!("Registered account {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            "User registered successfully",
            user.id,
        )),
    ))
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()?;

    let mut conn = state.db.acquire().await?;
    let user = store::find_user_by_email(&mut *conn, &req.email).await?;
    drop(conn);

    let Some(user) = user else {
        verify_decoy_blocking(req.password).await?;
        debug!("Login attempt for unknown account");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password_blocking(req.password, user.password_hash).await? {
        warn!("Failed login for account {}", user.id);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let issued = state.tokens.issue(&user.email)?;
    info!("Issued token {} for account {}", issued.jti, user.id);

    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}

/// POST /logout
///
/// Takes `BearerClaims`, not `AuthUser`: a repeated logout must reach the
/// denylist check and fail with `AlreadyRevoked`.
pub async fn handle_logout(
    State(state): State<AppState>,
    BearerClaims(claims): BearerClaims,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;

    let user = store::require_user(&mut *tx, &claims.sub).await?;

    if store::is_revoked(&mut *tx, &claims.jti).await? {
        return Err(AppError::AlreadyRevoked);
    }

    let revoked = store::revoke(&mut *tx, &claims.jti, user.id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AlreadyRevoked
            } else {
                e.into()
            }
        })?;

    tx.commit().await?;
    info!(
        "Revoked token {} for account {} at {}",
        revoked.jti, revoked.user_id, revoked.revoked_at
    );

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// DELETE /delete-account
pub async fn handle_delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;

    let account = store::require_user(&mut *tx, &user.email).await?;
    let purged = store::delete_revoked_for_user(&mut *tx, account.id).await?;
    store::delete_user(&mut *tx, account.id).await?;

    tx.commit().await?;
    info!(
        "Deleted account {} and {purged} revoked token record(s) (session {})",
        account.id, user.jti
    );

    Ok(Json(MessageResponse::new(
        "User account deleted successfully",
    )))
}

/// POST /forgot-password
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::Validation(
            "Email address is required".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;

    let user = store::find_user_by_email(&mut *tx, &req.email)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("User with that email address does not exist".to_string())
        })?;

    req.validate_passwords()?;

    let hash = hash_password_blocking(req.new_password).await?;
    store::update_password(&mut *tx, user.id, &hash).await?;

    tx.commit().await?;
    info!("Password reset for account {}", user.id);

    Ok(Json(MessageResponse::new("Password reset successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_register_accepts_matching_passwords() {
        assert!(register("a@b.com", "x", "x").validate().is_ok());
    }

    #[test]
    fn test_register_rejects_mismatch() {
        let err = register("a@b.com", "x", "y").validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("do not match")));
    }

    #[test]
    fn test_register_rejects_missing_fields() {
        assert!(register("", "x", "x").validate().is_err());
        assert!(register("a@b.com", "", "").validate().is_err());
    }

    #[test]
    fn test_register_payload_missing_field_deserializes_to_empty() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"x"}"#).unwrap();
        assert!(req.confirm_password.is_empty());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req = LoginRequest {
            email: "a@b.com".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_forgot_password_checks() {
        let mut req = ForgotPasswordRequest {
            email: "a@b.com".to_string(),
            new_password: "new".to_string(),
            confirm_password: "other".to_string(),
        };
        assert!(req.validate_passwords().is_err());

        req.confirm_password = "new".to_string();
        assert!(req.validate_passwords().is_ok());
    }
}
