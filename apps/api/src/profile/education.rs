use axum::{extract::State, http::StatusCode, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::{delete_owned, fetch_owned, list_owned};
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::EducationRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EducationPayload {
    pub course_title: Option<String>,
    pub institution: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Orders and bounds a study period.
///
/// `start` may not follow `end`; an `end` in the future is clamped to
/// `today`, after which `start` may not be in the future either.
pub fn normalize_period(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    if start > end {
        return Err(AppError::Validation(
            "End date cannot be before the start date".to_string(),
        ));
    }
    let end = end.min(today);
    if start > end {
        return Err(AppError::Validation(
            "Start date cannot be in the future".to_string(),
        ));
    }
    Ok((start, end))
}

impl EducationPayload {
    fn apply_to(self, row: &mut EducationRow, today: NaiveDate) -> Result<(), AppError> {
        let (start, end) = normalize_period(
            self.start_date.unwrap_or(row.start_date),
            self.end_date.unwrap_or(row.end_date),
            today,
        )?;
        row.start_date = start;
        row.end_date = end;

        if self.course_title.is_some() {
            row.course_title = self.course_title;
        }
        if self.institution.is_some() {
            row.institution = self.institution;
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

/// POST /education
pub async fn handle_create_education(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<EducationPayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let (Some(start), Some(end)) = (req.start_date, req.end_date) else {
        return Err(AppError::Validation(
            "Start date and end date are required".to_string(),
        ));
    };
    let (start, end) = normalize_period(start, end, Utc::now().date_naive())?;

    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let row = sqlx::query_as::<_, EducationRow>(
        r#"
        INSERT INTO education
            (user_id, user_email, course_title, institution, city, country,
             start_date, end_date, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.course_title)
    .bind(&req.institution)
    .bind(&req.city)
    .bind(&req.country)
    .bind(start)
    .bind(end)
    .bind(&req.description)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            "Education entry created successfully",
            row.id,
        )),
    ))
}

/// GET /education
pub async fn handle_list_education(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<EducationRow>>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        list_owned::<EducationRow>(&mut *conn, &user.email).await?,
    ))
}

/// GET /education/:id
pub async fn handle_get_education(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<EducationRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        fetch_owned::<EducationRow>(&mut *conn, id, &user.email).await?,
    ))
}

/// PUT|PATCH /education/:id
pub async fn handle_update_education(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<EducationPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut row = fetch_owned::<EducationRow>(&mut *tx, id, &user.email).await?;
    req.apply_to(&mut row, Utc::now().date_naive())?;

    sqlx::query(
        r#"
        UPDATE education
        SET course_title = $2, institution = $3, city = $4, country = $5,
            start_date = $6, end_date = $7, description = $8
        WHERE id = $1
        "#,
    )
    .bind(row.id)
    .bind(&row.course_title)
    .bind(&row.institution)
    .bind(&row.city)
    .bind(&row.country)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(&row.description)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new(
        "Education entry updated successfully",
    )))
}

/// DELETE /education/:id
pub async fn handle_delete_education(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    delete_owned::<EducationRow>(&mut *tx, id, &user.email).await?;
    tx.commit().await?;
    Ok(Json(MessageResponse::new(
        "Education entry deleted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_period_in_order_is_kept() {
        let (start, end) =
            normalize_period(date("2015-09-01"), date("2019-06-30"), date("2024-01-01")).unwrap();
        assert_eq!(start, date("2015-09-01"));
        assert_eq!(end, date("2019-06-30"));
    }

    #[test]
    fn test_inverted_period_rejected() {
        let err = normalize_period(date("2020-01-01"), date("2019-01-01"), date("2024-01-01"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("before the start")));
    }

    #[test]
    fn test_future_end_clamped_to_today() {
        let (_, end) =
            normalize_period(date("2022-09-01"), date("2026-06-30"), date("2024-01-01")).unwrap();
        assert_eq!(end, date("2024-01-01"));
    }

    #[test]
    fn test_future_start_rejected_after_clamp() {
        assert!(
            normalize_period(date("2025-01-01"), date("2026-01-01"), date("2024-01-01")).is_err()
        );
    }

    #[test]
    fn test_update_rechecks_order_against_stored_dates() {
        let mut row = EducationRow {
            id: 1,
            user_id: 1,
            user_email: "a@b.com".to_string(),
            course_title: Some("BSc".to_string()),
            institution: None,
            city: None,
            country: None,
            start_date: date("2015-09-01"),
            end_date: date("2019-06-30"),
            description: None,
        };
        let payload = EducationPayload {
            start_date: Some(date("2020-01-01")),
            ..Default::default()
        };
        assert!(payload.apply_to(&mut row, date("2024-01-01")).is_err());
        assert_eq!(row.start_date, date("2015-09-01"));
    }
}
