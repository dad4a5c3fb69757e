use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;

use super::fetch_owned;
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::ContactRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ContactPayload {
    pub cv_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Free-form map of network name to URL.
    pub social_links: Option<Value>,
}

impl ContactPayload {
    fn apply_to(self, row: &mut ContactRow) -> Result<(), AppError> {
        if self.cv_email.is_some() {
            row.cv_email = self.cv_email;
        }
        if self.phone.is_some() {
            row.phone = self.phone;
        }
        if self.address.is_some() {
            row.address = self.address;
        }
        if let Some(links) = self.social_links {
            row.social_links = social_links(Some(links))?;
        }
        Ok(())
    }
}

/// Normalizes `social_links` to a JSON object; absent or null becomes `{}`.
fn social_links(value: Option<Value>) -> Result<Value, AppError> {
    match value {
        None | Some(Value::Null) => Ok(Value::Object(Default::default())),
        Some(v @ Value::Object(_)) => Ok(v),
        Some(_) => Err(AppError::Validation(
            "social_links must be an object".to_string(),
        )),
    }
}

/// POST /contacts
pub async fn handle_create_contact(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<ContactPayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let links = social_links(req.social_links)?;

    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        INSERT INTO contacts (user_id, user_email, cv_email, phone, address, social_links)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.cv_email)
    .bind(&req.phone)
    .bind(&req.address)
    .bind(&links)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id("Contact created successfully", row.id)),
    ))
}

/// GET /contacts/:id
pub async fn handle_get_contact(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ContactRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        fetch_owned::<ContactRow>(&mut *conn, id, &user.email).await?,
    ))
}

/// PUT|PATCH /contacts/:id
pub async fn handle_update_contact(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<ContactPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut row = fetch_owned::<ContactRow>(&mut *tx, id, &user.email).await?;
    req.apply_to(&mut row)?;

    sqlx::query(
        r#"
        UPDATE contacts
        SET cv_email = $2, phone = $3, address = $4, social_links = $5
        WHERE id = $1
        "#,
    )
    .bind(row.id)
    .bind(&row.cv_email)
    .bind(&row.phone)
    .bind(&row.address)
    .bind(&row.social_links)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new("Contact updated successfully")))
}
