use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{delete_owned, fetch_owned, list_owned, require_text};
use crate::auth::extract::AuthUser;
use crate::auth::store::require_user;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::message::MessageResponse;
use crate::models::profile::SkillRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SkillPayload {
    pub skill: Option<String>,
    pub info: Option<String>,
    pub skill_level: Option<String>,
}

impl SkillPayload {
    fn apply_to(self, row: &mut SkillRow) -> Result<(), AppError> {
        if let Some(skill) = self.skill {
            require_text(Some(&skill), "Skill")?;
            row.skill = skill;
        }
        if self.info.is_some() {
            row.info = self.info;
        }
        if self.skill_level.is_some() {
            row.skill_level = self.skill_level;
        }
        Ok(())
    }
}

/// POST /skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<SkillPayload>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    require_text(req.skill.as_deref(), "Skill")?;

    let mut tx = state.db.begin().await?;
    let owner = require_user(&mut *tx, &user.email).await?;

    let row = sqlx::query_as::<_, SkillRow>(
        r#"
        INSERT INTO skills (user_id, user_email, skill, info, skill_level)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(owner.id)
    .bind(&owner.email)
    .bind(&req.skill)
    .bind(&req.info)
    .bind(&req.skill_level)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id("Skill created successfully", row.id)),
    ))
}

/// GET /skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<SkillRow>>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(list_owned::<SkillRow>(&mut *conn, &user.email).await?))
}

/// GET /skills/:id
pub async fn handle_get_skill(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<SkillRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(fetch_owned::<SkillRow>(&mut *conn, id, &user.email).await?))
}

/// PUT|PATCH /skills/:id
pub async fn handle_update_skill(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<SkillPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut row: SkillRow = fetch_owned(&mut *tx, id, &user.email).await?;
    req.apply_to(&mut row)?;

    sqlx::query("UPDATE skills SET skill = $2, info = $3, skill_level = $4 WHERE id = $1")
        .bind(row.id)
        .bind(&row.skill)
        .bind(&row.info)
        .bind(&row.skill_level)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse::new("Skill updated successfully")))
}

/// DELETE /skills/:id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    delete_owned::<SkillRow>(&mut *tx, id, &user.email).await?;
    tx.commit().await?;
    Ok(Json(MessageResponse::new("Skill deleted successfully")))
}
