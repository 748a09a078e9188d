//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{email_validator, name_validator, otp_validator};

/// Marker returned at sign-in when the account has not verified its email
pub const USER_UNVERIFIED: &str = "USER_UNVERIFIED";

/// Request payload for account registration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Email address (must be unique and valid format)
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// Registrant's full name (1-255 characters)
    #[validate(custom(function = "name_validator"))]
    pub full_name: String,

    /// Password (6-128 characters)
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6 and 128 characters"
    ))]
    pub password: String,
}

/// Response for account registration
#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub token: String,
    pub email: String,
    pub verified: bool,
}

/// Request payload for OTP verification (email taken from the bearer token)
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    /// 6-digit one-time passcode
    #[validate(custom(function = "otp_validator"))]
    pub otp: String,
}

/// Response for successful OTP verification
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub token: String,
    pub email: String,
    pub verified: bool,
}

/// Request payload for sign-in
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Response for sign-in against a verified account
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub email: String,
    pub verified: bool,
    pub full_name: String,
    pub profile_created: bool,
    pub company_id: Option<String>,
}

/// Response for sign-in against an unverified account; a fresh OTP has been
/// issued and the token lets the client proceed directly to the verify flow
#[derive(Debug, Serialize)]
pub struct UnverifiedResponse {
    pub token: String,
    pub verified: bool,
    pub code: &'static str,
}

/// Outcome of a sign-in attempt with valid credentials
#[derive(Debug)]
pub enum SignInOutcome {
    Verified(Box<SignInResponse>),
    Unverified(UnverifiedResponse),
}

/// Request payload for OTP resend
#[derive(Debug, Deserialize, Validate)]
pub struct ResendOtpRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,
}

/// Request payload for the forgot-password flow
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,
}

/// Response for the forgot-password flow; the token is bound to the
/// pre-reset identity so the client can present it at reset time
#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    pub token: String,
    pub email: String,
    pub message: String,
}

/// Request payload for resetting the password
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6 and 128 characters"
    ))]
    pub new_password: String,
}

/// Request payload for verifying a reset-purpose OTP, keyed by email in the
/// body rather than by token
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyResetOtpRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    #[validate(custom(function = "otp_validator"))]
    pub otp: String,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: bool,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_validation() {
        let valid = SignUpRequest {
            email: "a@x.com".to_string(),
            full_name: "A B".to_string(),
            password: "secret1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = SignUpRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignUpRequest {
            password: "abc".to_string(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_verify_otp_validation() {
        assert!(VerifyOtpRequest {
            otp: "123456".to_string()
        }
        .validate()
        .is_ok());
        assert!(VerifyOtpRequest {
            otp: "12345".to_string()
        }
        .validate()
        .is_err());
        assert!(VerifyOtpRequest {
            otp: "abcdef".to_string()
        }
        .validate()
        .is_err());
    }
}
