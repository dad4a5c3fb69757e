//! Argon2id password hashing. The `_blocking` variants run on tokio's
//! blocking pool.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use std::sync::OnceLock;

static DECOY_HASH: OnceLock<String> = OnceLock::new();

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("Password verification task panicked")?
}

/// Runs a full verification against a throwaway hash, so a login for an
/// unknown account takes as long as one with a wrong password.
pub async fn verify_decoy_blocking(password: String) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let hash = match DECOY_HASH.get() {
            Some(hash) => hash,
            None => {
                let fresh = hash_password("decoy-account-password")?;
                DECOY_HASH.get_or_init(|| fresh)
            }
        };
        verify_password(&password, hash).map(|_| ())
    })
    .await
    .context("Password verification task panicked")?
}
