//! Bearer Token Service
//!
//! Signs and validates the compact claims (`id`, `email`, `verified`) with
//! a shared secret and a fixed lifetime. Verification never throws past
//! this boundary: any failure (missing header, bad signature, expiry)
//! collapses to `None`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::TokenConfig;
use crate::models::TokenClaims;
use crate::utils::error::{AppError, AppResult};

/// Token issuer/verifier over a shared HS256 secret
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expires_in: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            expires_in: Duration::days(config.expires_days),
        }
    }

    /// Issue a token asserting the given identity and verification state
    pub fn issue(&self, id: i64, email: &str, verified: bool) -> AppResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            id,
            email: email.to_string(),
            verified,
            iat: now.timestamp(),
            exp: (now + self.expires_in).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    /// Validate a raw token string; `None` on any failure
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .ok()
    }

    /// Extract and validate a token from an `Authorization` header value:
    /// strip surrounding quote characters, split off the scheme prefix,
    /// then verify
    pub fn from_header(&self, header: &str) -> Option<TokenClaims> {
        let cleaned = header.trim().trim_matches(|c| c == '"' || c == '\'');

        let token = cleaned
            .strip_prefix("Bearer ")
            .or_else(|| cleaned.strip_prefix("bearer "))?
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');

        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&TokenConfig {
            secret: "test_signing_secret".to_string(),
            expires_days: 90,
        })
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let tokens = service();
        let token = tokens.issue(7, "a@x.com", false).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.email, "a@x.com");
        assert!(!claims.verified);
    }

    #[test]
    fn test_expiry_is_ninety_days() {
        let tokens = service();
        let token = tokens.issue(1, "a@x.com", true).unwrap();
        let claims = tokens.verify(&token).unwrap();

        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, Duration::days(90).num_seconds());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let tokens = service();
        let other = TokenService::new(&TokenConfig {
            secret: "a_different_secret".to_string(),
            expires_days: 90,
        });

        let token = tokens.issue(1, "a@x.com", true).unwrap();
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(service().verify("not-a-token").is_none());
        assert!(service().verify("").is_none());
    }

    #[test]
    fn test_header_extraction() {
        let tokens = service();
        let token = tokens.issue(3, "b@x.com", true).unwrap();

        assert!(tokens.from_header(&format!("Bearer {}", token)).is_some());
        assert!(tokens
            .from_header(&format!("\"Bearer {}\"", token))
            .is_some());
        assert!(tokens
            .from_header(&format!("Bearer \"{}\"", token))
            .is_some());

        // missing scheme, wrong scheme, bare garbage
        assert!(tokens.from_header(&token).is_none());
        assert!(tokens.from_header(&format!("Basic {}", token)).is_none());
        assert!(tokens.from_header("").is_none());
    }
}
