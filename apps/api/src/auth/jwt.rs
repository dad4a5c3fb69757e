//! Bearer tokens: HS256 JWTs whose `jti` is the revocation key.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email
    pub sub: String,
    /// Unique token id, checked against the denylist
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// A freshly signed token together with the values the caller reports back.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

/// Signs and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Issue a token for the account identified by `email`.
    pub fn issue(&self, email: &str) -> Result<IssuedToken> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: email.to_string(),
            jti: jti.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        let token = self.sign(&claims)?;
        Ok(IssuedToken {
            token,
            jti,
            expires_in: self.lifetime.num_seconds(),
        })
    }

    /// Check signature and expiry and return the claims. Revocation is not
    /// consulted here; see `auth::extract`.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::default();

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid access token")?;

        if data.claims.jti.is_empty() {
            anyhow::bail!("Token has no jti");
        }

        Ok(data.claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .context("Failed to encode access token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-key-for-testing", Duration::hours(24))
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();
        let issued = service.issue("a@b.com").unwrap();

        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, 24 * 3600);

        let claims = service.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_each_token_gets_its_own_jti() {
        let service = service();
        let first = service.issue("a@b.com").unwrap();
        let second = service.issue("a@b.com").unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(service().verify("invalid-token").is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = TokenService::new("another-secret", Duration::hours(24));
        let issued = other.issue("a@b.com").unwrap();
        assert!(service().verify(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "a@b.com".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = service.sign(&claims).unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_empty_jti_rejected() {
        let service = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "a@b.com".to_string(),
            jti: String::new(),
            iat: now,
            exp: now + 3600,
        };
        let token = service.sign(&claims).unwrap();
        assert!(service.verify(&token).is_err());
    }
}
