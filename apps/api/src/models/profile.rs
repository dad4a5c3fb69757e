use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// A profile table whose rows belong to exactly one account.
pub trait OwnedRow {
    /// SQL table name (already quoted where it collides with a keyword).
    const TABLE: &'static str;
    /// Human label used in error messages, e.g. "Skill".
    const LABEL: &'static str;
    /// Plural label used when a listing comes back empty.
    const PLURAL: &'static str;

    fn id(&self) -> i32;
    fn owner_email(&self) -> &str;
}

macro_rules! owned_row {
    ($row:ty, $table:literal, $label:literal, $plural:literal) => {
        impl OwnedRow for $row {
            const TABLE: &'static str = $table;
            const LABEL: &'static str = $label;
            const PLURAL: &'static str = $plural;

            fn id(&self) -> i32 {
                self.id
            }

            fn owner_email(&self) -> &str {
                &self.user_email
            }
        }
    };
}

#[derive(Debug, Clone, FromRow)]
pub struct BasicInfoRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub passport_id: Option<String>,
    pub gender: Option<String>,
    pub image_data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub cv_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub social_links: Value,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EducationRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub course_title: Option<String>,
    pub institution: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExperienceRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub employer: Option<String>,
    pub job_title: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LanguageRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub language: String,
    pub additional_info: Option<String>,
    pub language_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SkillRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub skill: String,
    pub info: Option<String>,
    pub skill_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReferenceRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub name: Option<String>,
    pub job_title: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProfileRow {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub description: Option<String>,
}

owned_row!(BasicInfoRow, "basic_info", "BasicInfo", "basic info");
owned_row!(ContactRow, "contacts", "Contact", "contacts");
owned_row!(EducationRow, "education", "Education entry", "education entries");
owned_row!(ExperienceRow, "experience", "Experience entry", "experience entries");
owned_row!(LanguageRow, "languages", "Language", "languages");
owned_row!(SkillRow, "skills", "Skill", "skills");
owned_row!(ReferenceRow, "\"references\"", "Reference", "references");
owned_row!(ProfileRow, "profiles", "Profile", "profiles");
