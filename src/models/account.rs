//! Account Model
//!
//! The identity record at the center of registration, verification, and
//! sign-in. One row/document per registrant, keyed by a numeric sequence id
//! assigned once at creation and a globally unique email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored account representation, including credential material
///
/// Never serialized into API responses directly; handlers expose
/// [`AccountView`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Numeric sequence id, assigned at creation and never reassigned
    pub id: i64,

    /// Unique email address (normalized: trimmed, lower-cased)
    pub email: String,

    /// Registrant's full name
    pub full_name: String,

    /// Salted password hash
    pub password_hash: String,

    /// Salt used for both the password hash and the OTP secret
    pub password_salt: String,

    /// Encrypted OTP secret, present while a code is outstanding
    pub otp_secret: Option<String>,

    /// OTP validity deadline; a code compares successfully only while
    /// `now <= otp_expiry`
    pub otp_expiry: Option<DateTime<Utc>>,

    /// Whether the registrant has proven control of their email via OTP
    pub verified: bool,

    /// Whether the applicant has created their biodata profile
    pub profile_created: bool,

    /// Password-reset token, unused by the current flows (the reset flow
    /// reuses the OTP fields) but part of the stored record shape
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set for creating a new account
///
/// The id, timestamps, and flag defaults are assigned by the storage engine.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub password_salt: String,
    pub otp_secret: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
}

/// Partial update for an account; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub full_name: Option<String>,
    pub password_hash: Option<String>,
    pub password_salt: Option<String>,
    pub otp_secret: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
    pub verified: Option<bool>,
    pub profile_created: Option<bool>,
}

impl AccountChanges {
    /// Rotation of the outstanding OTP: new secret, new deadline
    pub fn otp_rotation(secret: String, expiry: DateTime<Utc>) -> Self {
        Self {
            otp_secret: Some(secret),
            otp_expiry: Some(expiry),
            ..Self::default()
        }
    }

    /// Replacement of the password credential: new hash and salt together
    pub fn password_replacement(hash: String, salt: String) -> Self {
        Self {
            password_hash: Some(hash),
            password_salt: Some(salt),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.password_hash.is_none()
            && self.password_salt.is_none()
            && self.otp_secret.is_none()
            && self.otp_expiry.is_none()
            && self.verified.is_none()
            && self.profile_created.is_none()
    }
}

/// Account representation for API responses, without credential material
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub verified: bool,
    pub profile_created: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        AccountView {
            id: account.id,
            email: account.email,
            full_name: account.full_name,
            verified: account.verified,
            profile_created: account.profile_created,
            created_at: account.created_at,
        }
    }
}

impl Account {
    /// Whether the stored OTP is still inside its validity window
    pub fn otp_window_open(&self, now: DateTime<Utc>) -> bool {
        match self.otp_expiry {
            Some(expiry) => now <= expiry,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_account() -> Account {
        Account {
            id: 1,
            email: "a@x.com".to_string(),
            full_name: "A B".to_string(),
            password_hash: "hash".to_string(),
            password_salt: "salt".to_string(),
            otp_secret: Some("secret".to_string()),
            otp_expiry: Some(Utc::now() + Duration::minutes(30)),
            verified: false,
            profile_created: false,
            reset_token: None,
            reset_token_expiry: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_strips_credentials() {
        let view = AccountView::from(sample_account());
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_salt").is_none());
        assert!(json.get("otp_secret").is_none());
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn test_otp_window() {
        let mut account = sample_account();
        assert!(account.otp_window_open(Utc::now()));

        account.otp_expiry = Some(Utc::now() - Duration::minutes(1));
        assert!(!account.otp_window_open(Utc::now()));

        account.otp_expiry = None;
        assert!(!account.otp_window_open(Utc::now()));
    }

    #[test]
    fn test_changes_constructors() {
        let rotation = AccountChanges::otp_rotation("s".into(), Utc::now());
        assert!(rotation.otp_secret.is_some());
        assert!(rotation.otp_expiry.is_some());
        assert!(rotation.password_hash.is_none());

        let replacement = AccountChanges::password_replacement("h".into(), "s".into());
        assert!(replacement.password_hash.is_some());
        assert!(replacement.password_salt.is_some());
        assert!(replacement.otp_secret.is_none());

        assert!(AccountChanges::default().is_empty());
        assert!(!rotation.is_empty());
    }
}
