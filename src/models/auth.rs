//! Bearer Token Claims
//!
//! Compact claims carried in the signed bearer token: identity, email, and
//! verification state. No server-side session store backs these.

use serde::{Deserialize, Serialize};

/// Claims signed into every issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Account's numeric sequence id
    pub id: i64,

    /// Account email at issuance time
    pub email: String,

    /// Verification state at issuance time
    pub verified: bool,

    /// Issued-at, seconds since the epoch
    pub iat: i64,

    /// Expiry, seconds since the epoch
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serde_roundtrip() {
        let claims = TokenClaims {
            id: 7,
            email: "a@x.com".to_string(),
            verified: true,
            iat: 1_700_000_000,
            exp: 1_700_777_600,
        };

        let json = serde_json::to_string(&claims).unwrap();
        let back: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims, back);
    }
}
