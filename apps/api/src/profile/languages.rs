use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::{delete_owned, fetch_owned, list_owned, require_text};
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::LanguageRow;
use crate::state::AppState;

/// CEFR proficiency bands plus native speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    #[serde(alias = "native")]
    Native,
}

impl LanguageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageLevel::A1 => "A1",
            LanguageLevel::A2 => "A2",
            LanguageLevel::B1 => "B1",
            LanguageLevel::B2 => "B2",
            LanguageLevel::C1 => "C1",
            LanguageLevel::C2 => "C2",
            LanguageLevel::Native => "Native",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguagePayload {
    pub language: Option<String>,
    pub additional_info: Option<String>,
    pub language_level: Option<LanguageLevel>,
}

impl LanguagePayload {
    fn apply_to(self, row: &mut LanguageRow) -> Result<(), AppError> {
        if let Some(language) = self.language {
            require_text(Some(&language), "Language")?;
            row.language = language;
        }
        if self.additional_info.is_some() {
            row.additional_info = self.additional_info;
        }
        if let Some(level) = self.language_level {
            row.language_level = Some(level.as_str().to_string());
        }
        Ok(())
    }
}

/// POST /languages
pub async fn handle_create_language(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<LanguagePayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    require_text(req.language.as_deref(), "Language")?;

    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let row = sqlx::query_as::<_, LanguageRow>(
        r#"
        INSERT INTO languages (user_id, user_email, language, additional_info, language_level)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.language)
    .bind(&req.additional_info)
    .bind(req.language_level.map(|l| l.as_str()))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            "Language created successfully",
            row.id,
        )),
    ))
}

/// GET /languages
pub async fn handle_list_languages(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<LanguageRow>>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        list_owned::<LanguageRow>(&mut *conn, &user.email).await?,
    ))
}

/// GET /languages/:id
pub async fn handle_get_language(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<LanguageRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(
        fetch_owned::<LanguageRow>(&mut *conn, id, &user.email).await?,
    ))
}

/// PUT|PATCH /languages/:id
pub async fn handle_update_language(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<LanguagePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut row = fetch_owned::<LanguageRow>(&mut *tx, id, &user.email).await?;
    req.apply_to(&mut row)?;

    sqlx::query(
        "UPDATE languages SET language = $2, additional_info = $3, language_level = $4 WHERE id = $1",
    )
    .bind(row.id)
    .bind(&row.language)
    .bind(&row.additional_info)
    .bind(&row.language_level)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new("Language updated successfully")))
}

/// DELETE /languages/:id
pub async fn handle_delete_language(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    delete_owned::<LanguageRow>(&mut *tx, id, &user.email).await?;
    tx.commit().await?;
    Ok(Json(MessageResponse::new("Language deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parses_cefr_and_native() {
        let payload: LanguagePayload =
            serde_json::from_str(r#"{"language":"German","language_level":"B2"}"#).unwrap();
        assert_eq!(payload.language_level, Some(LanguageLevel::B2));

        let payload: LanguagePayload =
            serde_json::from_str(r#"{"language":"Greek","language_level":"native"}"#).unwrap();
        assert_eq!(payload.language_level, Some(LanguageLevel::Native));
    }

    #[test]
    fn test_unknown_level_rejected() {
        let result: Result<LanguagePayload, _> =
            serde_json::from_str(r#"{"language":"German","language_level":"fluent-ish"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_stores_level_as_text() {
        let mut row = LanguageRow {
            id: 3,
            user_id: 1,
            user_email: "a@b.com".to_string(),
            language: "German".to_string(),
            additional_info: None,
            language_level: Some("A2".to_string()),
        };
        let payload = LanguagePayload {
            language_level: Some(LanguageLevel::C1),
            ..Default::default()
        };
        payload.apply_to(&mut row).unwrap();
        assert_eq!(row.language_level.as_deref(), Some("C1"));
        assert_eq!(row.language, "German");
    }
}
