use axum::{extract::State, http::StatusCode, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::fetch_owned;
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::BasicInfoRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BasicInfoPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub passport_id: Option<String>,
    pub gender: Option<String>,
    /// Base64-encoded portrait.
    pub image_data: Option<String>,
}

/// Wire form of `BasicInfoRow`, with the image re-encoded as base64.
#[derive(Debug, Serialize)]
pub struct BasicInfoView {
    pub id: i32,
    pub user_email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub passport_id: Option<String>,
    pub gender: Option<String>,
    pub image_data: Option<String>,
}

impl From<BasicInfoRow> for BasicInfoView {
    fn from(row: BasicInfoRow) -> Self {
        Self {
            id: row.id,
            user_email: row.user_email,
            first_name: row.first_name,
            last_name: row.last_name,
            job_title: row.job_title,
            date_of_birth: row.date_of_birth,
            nationality: row.nationality,
            passport_id: row.passport_id,
            gender: row.gender,
            image_data: row.image_data.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}

/// Decodes an optional base64 image. Empty strings count as "no image".
pub fn decode_image(encoded: Option<&str>) -> Result<Option<Vec<u8>>, AppError> {
    match encoded.map(str::trim) {
        None | Some("") => Ok(None),
        Some(data) => STANDARD
            .decode(data)
            .map(Some)
            .map_err(|e| AppError::Validation(format!("Invalid image data: {e}"))),
    }
}

impl BasicInfoPayload {
    fn apply_to(self, row: &mut BasicInfoRow) -> Result<(), AppError> {
        if let Some(image) = decode_image(self.image_data.as_deref())? {
            row.image_data = Some(image);
        }
        if self.first_name.is_some() {
            row.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            row.last_name = self.last_name;
        }
        if self.job_title.is_some() {
            row.job_title = self.job_title;
        }
        if self.date_of_birth.is_some() {
            row.date_of_birth = self.date_of_birth;
        }
        if self.nationality.is_some() {
            row.nationality = self.nationality;
        }
        if self.passport_id.is_some() {
            row.passport_id = self.passport_id;
        }
        if self.gender.is_some() {
            row.gender = self.gender;
        }
        Ok(())
    }
}

fn already_exists() -> AppError {
    AppError::Validation("BasicInfo already exists for this user".to_string())
}

/// POST /basic-info
pub async fn handle_create_basic_info(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<BasicInfoPayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let image = decode_image(req.image_data.as_deref())?;

    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM basic_info WHERE user_id = $1)")
            .bind(owner.id)
            .fetch_one(&mut *tx)
            .await?;
    if exists {
        return Err(already_exists());
    }

    let row = sqlx::query_as::<_, BasicInfoRow>(
        r#"
        INSERT INTO basic_info
            (user_id, user_email, first_name, last_name, job_title, date_of_birth,
             nationality, passport_id, gender, image_data)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.job_title)
    .bind(req.date_of_birth)
    .bind(&req.nationality)
    .bind(&req.passport_id)
    .bind(&req.gender)
    .bind(&image)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            already_exists()
        } else {
            e.into()
        }
    })?;

    tx.commit().await?;
    info!("Created basic info {} for account {}", row.id, owner.id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            "BasicInfo created successfully",
            row.id,
        )),
    ))
}

/// GET /basic-info/:id
pub async fn handle_get_basic_info(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<BasicInfoView>, AppError> {
    let mut conn = state.db.acquire().await?;
    let row = fetch_owned::<BasicInfoRow>(&mut *conn, id, &user.email).await?;
    Ok(Json(row.into()))
}

/// PUT|PATCH /basic-info/:id
pub async fn handle_update_basic_info(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<BasicInfoPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut row = fetch_owned::<BasicInfoRow>(&mut *tx, id, &user.email).await?;
    req.apply_to(&mut row)?;

    sqlx::query(
        r#"
        UPDATE basic_info
        SET first_name = $2, last_name = $3, job_title = $4, date_of_birth = $5,
            nationality = $6, passport_id = $7, gender = $8, image_data = $9
        WHERE id = $1
        "#,
    )
    .bind(row.id)
    .bind(&row.first_name)
    .bind(&row.last_name)
    .bind(&row.job_title)
    .bind(row.date_of_birth)
    .bind(&row.nationality)
    .bind(&row.passport_id)
    .bind(&row.gender)
    .bind(&row.image_data)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new("BasicInfo updated successfully")))
}
