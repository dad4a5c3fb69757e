use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{delete_owned, fetch_owned, list_owned};
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::ReferenceRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReferencePayload {
    pub name: Option<String>,
    pub job_title: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ReferencePayload {
    fn apply_to(self, row: &mut ReferenceRow) {
        let ReferencePayload {
            name,
            job_title,
            organization,
            email,
            phone,
        } = self;
        if name.is_some() {
            row.name = name;
        }
        if job_title.is_some() {
            row.job_title = job_title;
        }
        if organization.is_some() {
            row.organization = organization;
        }
        if email.is_some() {
            row.email = email;
        }
        if phone.is_some() {
            row.phone = phone;
        }
    }
}

/// POST /references
pub async fn handle_create_reference(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<ReferencePayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let row = sqlx::query_as::<_, ReferenceRow>(
        r#"
        INSERT INTO "references" (user_id, user_email, name, job_title, organization, email, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.name)
    .bind(&req.job_title)
    .bind(&req.organization)
    .bind(&req.email)
    .bind(&req.phone)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            "Reference created successfully",
            row.id,
        )),
    ))
}

/// GET /references
pub async fn handle_list_references(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ReferenceRow>>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        list_owned::<ReferenceRow>(&mut *conn, &user.email).await?,
    ))
}

/// GET /references/:id
pub async fn handle_get_reference(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ReferenceRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        fetch_owned::<ReferenceRow>(&mut *conn, id, &user.email).await?,
    ))
}

/// PUT|PATCH /references/:id
pub async fn handle_update_reference(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<ReferencePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut row = fetch_owned::<ReferenceRow>(&mut *tx, id, &user.email).await?;
    req.apply_to(&mut row);

    sqlx::query(
        r#"
        UPDATE "references"
        SET name = $2, job_title = $3, organization = $4, email = $5, phone = $6
        WHERE id = $1
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.job_title)
    .bind(&row.organization)
    .bind(&row.email)
    .bind(&row.phone)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new("Reference updated successfully")))
}

/// DELETE /references/:id
pub async fn handle_delete_reference(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    delete_owned::<ReferenceRow>(&mut *tx, id, &user.email).await?;
    tx.commit().await?;
    Ok(Json(MessageResponse::new("Reference deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ReferenceRow {
        ReferenceRow {
            id: 3,
            user_id: 1,
            user_email: "a@b.com".to_string(),
            name: Some("Grace Hopper".to_string()),
            job_title: Some("Rear Admiral".to_string()),
            organization: Some("US Navy".to_string()),
            email: None,
            phone: Some("555-0100".to_string()),
        }
    }

    #[test]
    fn test_partial_update_keeps_untouched_fields() {
        let mut row = row();
        let payload: ReferencePayload =
            serde_json::from_str(r#"{"email":"grace@navy.mil"}"#).unwrap();
        payload.apply_to(&mut row);

        assert_eq!(row.email.as_deref(), Some("grace@navy.mil"));
        assert_eq!(row.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(row.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_null_does_not_clear_a_field() {
        let mut row = row();
        let payload: ReferencePayload =
            serde_json::from_str(r#"{"organization":null,"job_title":"Commodore"}"#).unwrap();
        payload.apply_to(&mut row);

        assert_eq!(row.organization.as_deref(), Some("US Navy"));
        assert_eq!(row.job_title.as_deref(), Some("Commodore"));
    }

    #[test]
    fn test_owner_fields_in_body_are_not_applied() {
        let mut row = row();
        let payload: ReferencePayload =
            serde_json::from_str(r#"{"user_email":"mallory@b.com","user_id":9}"#).unwrap();
        payload.apply_to(&mut row);

        assert_eq!(row.user_email, "a@b.com");
        assert_eq!(row.user_id, 1);
    }
}
