//! Account Lifecycle Service
//!
//! The authentication/verification state machine: sign-up, OTP
//! verification, sign-in with the verification gate, OTP resend, and the
//! password-reset flow. Orchestrates the credential primitives, the token
//! issuer, and the persistence adapter; never touches engine-specific
//! query syntax.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{
    AccountChanges, ForgotPasswordRequest, ForgotPasswordResponse, MessageResponse, NewAccount,
    ResendOtpRequest, ResetPasswordRequest, SignInOutcome, SignInRequest, SignInResponse,
    SignUpRequest, SignUpResponse, UnverifiedResponse, VerifyOtpRequest, VerifyResetOtpRequest,
    VerifyResponse, DEFAULT_INTEGRATION_ID, USER_UNVERIFIED,
};
use crate::service::email::Mailer;
use crate::service::token::TokenService;
use crate::storage::{StorageAdapter, StorageError};
use crate::utils::error::{AppError, AppResult};
use crate::utils::security::{
    encrypt_otp, generate_otp, generate_salt, hash_password, validate_otp, validate_password,
};
use crate::utils::validation::normalize_email;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Business logic for account registration, verification, and sign-in
pub struct AccountService {
    storage: Arc<dyn StorageAdapter>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenService,
    ) -> Self {
        Self {
            storage,
            mailer,
            tokens,
        }
    }

    /// Register a new, unverified account and dispatch its first OTP
    ///
    /// The existence pre-check is a latency optimization; the storage
    /// engine's uniqueness constraint is the arbiter under races, and both
    /// paths collapse to the same `Conflict`.
    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<SignUpResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid sign-up data: {}", e)))?;

        let email = normalize_email(&request.email);

        if self.storage.find_account_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let salt = generate_salt();
        let password_hash = hash_password(&request.password, &salt)?;

        let otp = generate_otp();
        let otp_secret = encrypt_otp(otp.code, &salt)?;

        let account = self
            .storage
            .create_account(NewAccount {
                email: email.clone(),
                full_name: request.full_name.trim().to_string(),
                password_hash,
                password_salt: salt,
                otp_secret: Some(otp_secret),
                otp_expiry: Some(otp.expires_at),
            })
            .await
            .map_err(|e| match e {
                StorageError::Duplicate => {
                    AppError::Conflict("Email already registered".to_string())
                }
                other => other.into(),
            })?;

        self.mailer
            .send_otp_email(&account.email, &account.full_name, otp.code)
            .await?;

        let token = self.tokens.issue(account.id, &account.email, false)?;
        log::info!("account {} registered, verification pending", account.id);

        Ok(SignUpResponse {
            token,
            email: account.email,
            verified: false,
        })
    }

    /// Prove email control with an OTP; `Unverified -> Verified`
    ///
    /// Mismatch and expiry are externally the same outcome, and neither
    /// mutates stored state.
    pub async fn verify_otp(
        &self,
        email: &str,
        request: VerifyOtpRequest,
    ) -> AppResult<VerifyResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let email = normalize_email(email);
        let account = self
            .storage
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        self.check_otp(
            &account.otp_secret,
            account.otp_window_open(Utc::now()),
            &request.otp,
            &account.password_salt,
        )?;

        let updated = self
            .storage
            .update_account_by_email(
                &email,
                AccountChanges {
                    verified: Some(true),
                    ..AccountChanges::default()
                },
            )
            .await?;

        let token = self.tokens.issue(updated.id, &updated.email, true)?;
        log::info!("account {} verified", updated.id);

        Ok(VerifyResponse {
            token,
            email: updated.email,
            verified: true,
        })
    }

    /// Authenticate; unverified accounts are gated into the OTP flow
    ///
    /// Absent email and wrong password produce the identical error, never
    /// revealing whether the email exists.
    pub async fn sign_in(&self, request: SignInRequest) -> AppResult<SignInOutcome> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let email = normalize_email(&request.email);

        let account = self
            .storage
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !validate_password(&request.password, &account.password_hash, &account.password_salt) {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !account.verified {
            let otp = generate_otp();
            let otp_secret = encrypt_otp(otp.code, &account.password_salt)?;

            self.storage
                .update_account_by_email(
                    &email,
                    AccountChanges::otp_rotation(otp_secret, otp.expires_at),
                )
                .await?;

            self.mailer
                .send_otp_email(&account.email, &account.full_name, otp.code)
                .await?;

            let token = self.tokens.issue(account.id, &account.email, false)?;
            log::info!("unverified sign-in for account {}, OTP rotated", account.id);

            return Ok(SignInOutcome::Unverified(UnverifiedResponse {
                token,
                verified: false,
                code: USER_UNVERIFIED,
            }));
        }

        let company_id = match self
            .storage
            .find_integration_config(DEFAULT_INTEGRATION_ID)
            .await?
        {
            Some(config) => Some(config.company_id),
            None => self
                .storage
                .find_first_integration_config()
                .await?
                .map(|config| config.company_id),
        };

        let token = self.tokens.issue(account.id, &account.email, true)?;

        Ok(SignInOutcome::Verified(Box::new(SignInResponse {
            token,
            email: account.email,
            verified: true,
            full_name: account.full_name,
            profile_created: account.profile_created,
            company_id,
        })))
    }

    /// Rotate the outstanding OTP for an account, if it exists
    ///
    /// The response is identical whether or not the email is registered.
    pub async fn resend_otp(&self, request: ResendOtpRequest) -> AppResult<MessageResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let email = normalize_email(&request.email);

        if let Some(account) = self.storage.find_account_by_email(&email).await? {
            let otp = generate_otp();
            let otp_secret = encrypt_otp(otp.code, &account.password_salt)?;

            self.storage
                .update_account_by_email(
                    &email,
                    AccountChanges::otp_rotation(otp_secret, otp.expires_at),
                )
                .await?;

            self.mailer
                .send_otp_email(&account.email, &account.full_name, otp.code)
                .await?;
        }

        Ok(MessageResponse::new(
            "If the account exists, a new OTP has been sent",
        ))
    }

    /// Start the password-reset flow: rotate a reset-purpose OTP and hand
    /// back a token bound to the pre-reset identity
    pub async fn forgot_password(
        &self,
        request: ForgotPasswordRequest,
    ) -> AppResult<ForgotPasswordResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let email = normalize_email(&request.email);

        let account = self
            .storage
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let otp = generate_otp();
        let otp_secret = encrypt_otp(otp.code, &account.password_salt)?;

        self.storage
            .update_account_by_email(
                &email,
                AccountChanges::otp_rotation(otp_secret, otp.expires_at),
            )
            .await?;

        self.mailer
            .send_reset_email(&account.email, &account.full_name, otp.code)
            .await?;

        let token = self
            .tokens
            .issue(account.id, &account.email, account.verified)?;

        Ok(ForgotPasswordResponse {
            token,
            email: account.email,
            message: "A password reset code has been sent".to_string(),
        })
    }

    /// Replace the password credential with a fresh salt and hash
    ///
    /// The one mutation that goes through the id-keyed update path: the
    /// numeric id is the durable handle, while email may later be treated
    /// as mutable.
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> AppResult<MessageResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let email = normalize_email(&request.email);

        let account = self
            .storage
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let salt = generate_salt();
        let password_hash = hash_password(&request.new_password, &salt)?;

        self.storage
            .update_account_by_id(
                account.id,
                AccountChanges::password_replacement(password_hash, salt),
            )
            .await?;

        log::info!("password replaced for account {}", account.id);
        Ok(MessageResponse::new("Password has been reset"))
    }

    /// Verify a reset-purpose OTP, keyed by email in the body
    ///
    /// Also marks the account verified on success, matching the original
    /// portal's behavior of treating any proven OTP as proof of email
    /// ownership.
    pub async fn verify_reset_otp(
        &self,
        request: VerifyResetOtpRequest,
    ) -> AppResult<VerifyResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let email = normalize_email(&request.email);
        let account = self
            .storage
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        self.check_otp(
            &account.otp_secret,
            account.otp_window_open(Utc::now()),
            &request.otp,
            &account.password_salt,
        )?;

        let updated = self
            .storage
            .update_account_by_email(
                &email,
                AccountChanges {
                    verified: Some(true),
                    ..AccountChanges::default()
                },
            )
            .await?;

        let token = self.tokens.issue(updated.id, &updated.email, true)?;

        Ok(VerifyResponse {
            token,
            email: updated.email,
            verified: true,
        })
    }

    /// Shared OTP comparison: mismatch and expiry collapse to one outcome
    fn check_otp(
        &self,
        stored_secret: &Option<String>,
        window_open: bool,
        submitted: &str,
        salt: &str,
    ) -> AppResult<()> {
        let secret = stored_secret.as_ref().ok_or(AppError::InvalidOtp)?;
        let code: u32 = submitted.parse().map_err(|_| AppError::InvalidOtp)?;

        if !validate_otp(code, secret, salt) || !window_open {
            return Err(AppError::InvalidOtp);
        }

        Ok(())
    }
}
