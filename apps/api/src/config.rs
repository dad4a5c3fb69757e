use anyhow::{bail, Context, Result};

/// Upper bound for `JWT_EXPIRY_HOURS`: one year.
const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 365;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: require_env("JWT_SECRET_KEY")?,
            jwt_expiry_hours: check_expiry_hours(parse_env("JWT_EXPIRY_HOURS", 24)?)
                .context("Invalid JWT_EXPIRY_HOURS")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn check_expiry_hours(hours: i64) -> Result<i64> {
    if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) {
        bail!("token lifetime must be between 1 and {MAX_JWT_EXPIRY_HOURS} hours, got {hours}");
    }
    Ok(hours)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
