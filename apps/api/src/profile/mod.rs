//! Owner-scoped CRUD over the CV profile tables.
//!
//! Every row carries its owner's email; the helpers here load rows by id and
//! turn "missing" into 404 and "someone else's" into 401.

pub mod basic_info;
pub mod contact;
pub mod education;
pub mod experience;
pub mod languages;
pub mod references;
pub mod skills;
pub mod summary;

use sqlx::{postgres::PgRow, FromRow, PgConnection};
use tracing::warn;

use crate::errors::AppError;
use crate::models::profile::OwnedRow;

/// Checks that `row` exists and belongs to `email`.
pub fn ensure_owner<T: OwnedRow>(row: Option<T>, email: &str) -> Result<T, AppError> {
    let row = row.ok_or_else(|| AppError::NotFound(format!("{} not found", T::LABEL)))?;
    if row.owner_email() != email {
        warn!("Ownership check failed on {} {}", T::TABLE, row.id());
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }
    Ok(row)
}

pub async fn fetch_owned<T>(conn: &mut PgConnection, id: i32, email: &str) -> Result<T, AppError>
where
    T: OwnedRow + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    ensure_owner(row, email)
}

/// All rows owned by `email`, oldest first. An empty result is a 404.
pub async fn list_owned<T>(conn: &mut PgConnection, email: &str) -> Result<Vec<T>, AppError>
where
    T: OwnedRow + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT * FROM {} WHERE user_email = $1 ORDER BY id",
        T::TABLE
    );
    let rows = sqlx::query_as::<_, T>(&sql)
        .bind(email)
        .fetch_all(conn)
        .await?;

    if rows.is_empty() {
        return Err(AppError::NotFound(format!(
            "No {} found for the user",
            T::PLURAL
        )));
    }
    Ok(rows)
}

pub async fn delete_owned<T>(conn: &mut PgConnection, id: i32, email: &str) -> Result<T, AppError>
where
    T: OwnedRow + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let row = fetch_owned::<T>(&mut *conn, id, email).await?;

    let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
    sqlx::query(&sql).bind(id).execute(conn).await?;
    Ok(row)
}

/// Rejects a present-but-blank value for a required text field.
pub fn require_text(value: Option<&str>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::SkillRow;

    fn skill(owner: &str) -> SkillRow {
        SkillRow {
            id: 7,
            user_id: 1,
            user_email: owner.to_string(),
            skill: "Rust".to_string(),
            info: None,
            skill_level: Some("Expert".to_string()),
        }
    }

    #[test]
    fn test_owner_passes() {
        let row = ensure_owner(Some(skill("a@b.com")), "a@b.com").unwrap();
        assert_eq!(row.id, 7);
    }

    #[test]
    fn test_missing_row_is_not_found() {
        let err = ensure_owner::<SkillRow>(None, "a@b.com").unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Skill not found"));
    }

    #[test]
    fn test_foreign_row_is_unauthorized() {
        let err = ensure_owner(Some(skill("other@b.com")), "a@b.com").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_require_text() {
        assert!(require_text(Some("Rust"), "Skill").is_ok());
        assert!(require_text(Some("  "), "Skill").is_err());
        assert!(require_text(None, "Skill").is_err());
    }
}
