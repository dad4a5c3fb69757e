use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{delete_owned, fetch_owned, list_owned};
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::ExperienceRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExperiencePayload {
    pub employer: Option<String>,
    pub job_title: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Absent for a current position.
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

fn check_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(AppError::Validation(
            "End date cannot be before the start date".to_string(),
        )),
        _ => Ok(()),
    }
}

impl ExperiencePayload {
    fn apply_to(self, row: &mut ExperienceRow) -> Result<(), AppError> {
        let start = self.start_date.or(row.start_date);
        let end = self.end_date.or(row.end_date);
        check_order(start, end)?;
        row.start_date = start;
        row.end_date = end;

        if self.employer.is_some() {
            row.employer = self.employer;
        }
        if self.job_title.is_some() {
            row.job_title = self.job_title;
        }
        if self.city.is_some() {
            row.city = self.city;
        }
        if self.country.is_some() {
            row.country = self.country;
        }
        if self.description.is_some() {
            row.description = self.description;
        }
        Ok(())
    }
}

/// POST /experience
pub async fn handle_create_experience(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<ExperiencePayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    check_order(req.start_date, req.end_date)?;

    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        INSERT INTO experience
            (user_id, user_email, employer, job_title, city, country,
             start_date, end_date, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.employer)
    .bind(&req.job_title)
    .bind(&req.city)
    .bind(&req.country)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(&req.description)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            "Experience entry created successfully",
            row.id,
        )),
    ))
}

/// GET /experience
pub async fn handle_list_experience(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ExperienceRow>>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        list_owned::<ExperienceRow>(&mut *conn, &user.email).await?,
    ))
}

/// GET /experience/:id
pub async fn handle_get_experience(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ExperienceRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        fetch_owned::<ExperienceRow>(&mut *conn, id, &user.email).await?,
    ))
}

/// PUT|PATCH /experience/:id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<ExperiencePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut row = fetch_owned::<ExperienceRow>(&mut *tx, id, &user.email).await?;
    req.apply_to(&mut row)?;

    sqlx::query(
        r#"
        UPDATE experience
        SET employer = $2, job_title = $3, city = $4, country = $5,
            start_date = $6, end_date = $7, description = $8
        WHERE id = $1
        "#,
    )
    .bind(row.id)
    .bind(&row.employer)
    .bind(&row.job_title)
    .bind(&row.city)
    .bind(&row.country)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(&row.description)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new(
        "Experience entry updated successfully",
    )))
}

/// DELETE /experience/:id
pub async fn handle_delete_experience(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    delete_owned::<ExperienceRow>(&mut *tx, id, &user.email).await?;
    tx.commit().await?;
    Ok(Json(MessageResponse::new(
        "Experience entry deleted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_open_ended_position_allowed() {
        assert!(check_order(Some(date("2021-03-01")), None).is_ok());
    }

    #[test]
    fn test_inverted_dates_rejected() {
        assert!(check_order(Some(date("2021-03-01")), Some(date("2020-03-01"))).is_err());
    }

    #[test]
    fn test_bad_date_format_fails_to_deserialize() {
        let result: Result<ExperiencePayload, _> =
            serde_json::from_str(r#"{"start_date":"March 2021"}"#);
        assert!(result.is_err());
    }
}
