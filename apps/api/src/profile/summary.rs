//! The free-text profile summary shown at the top of a CV.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{delete_owned, fetch_owned};
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::ProfileRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProfilePayload {
    pub description: Option<String>,
}

impl ProfilePayload {
    /// The description to store on update; a missing or empty one is a 400.
    fn into_update(self) -> Result<String, AppError> {
        self.description
            .filter(|d| !d.is_empty())
            .ok_or_else(|| AppError::Validation("No data provided for updating".to_string()))
    }
}

/// POST /profile
pub async fn handle_create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<ProfilePayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let row = sqlx::query_as::<_, ProfileRow>(
        "INSERT INTO profiles (user_id, user_email, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.description)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id("Profile created successfully", row.id)),
    ))
}

/// GET /profile/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ProfileRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        fetch_owned::<ProfileRow>(&mut *conn, id, &user.email).await?,
    ))
}

/// PUT|PATCH /profile/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<ProfilePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let row = fetch_owned::<ProfileRow>(&mut *tx, id, &user.email).await?;

    let description = req.into_update()?;

    sqlx::query("UPDATE profiles SET description = $2 WHERE id = $1")
        .bind(row.id)
        .bind(&description)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

/// DELETE /profile/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    delete_owned::<ProfileRow>(&mut *tx, id, &user.email).await?;
    tx.commit().await?;
    Ok(Json(MessageResponse::new("Profile deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_takes_new_description() {
        let payload: ProfilePayload =
            serde_json::from_str(r#"{"description":"Backend engineer"}"#).unwrap();
        assert_eq!(payload.into_update().unwrap(), "Backend engineer");
    }

    #[test]
    fn test_update_without_description_is_rejected() {
        for body in [r#"{}"#, r#"{"description":""}"#, r#"{"description":null}"#] {
            let payload: ProfilePayload = serde_json::from_str(body).unwrap();
            let err = payload.into_update().unwrap_err();
            assert!(
                matches!(&err, AppError::Validation(msg) if msg == "No data provided for updating"),
                "{body}"
            );
        }
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let payload: ProfilePayload =
            serde_json::from_str(r#"{"description":"x","user_email":"other@b.com"}"#).unwrap();
        assert_eq!(payload.description.as_deref(), Some("x"));
    }
}
