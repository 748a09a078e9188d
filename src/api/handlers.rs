//! HTTP Request Handlers
//!
//! Thin request/response mapping over the service layer. Handlers decide
//! status codes; services decide everything else.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::api::middleware::AuthUser;
use crate::models::requests::*;
use crate::models::{AppSetup, AppSetupChanges, ApplicantProfile, ProfileInput};
use crate::service::{
    AccountService, IntegrationService, ProfileService, SetupService, TokenService,
};
use crate::storage::StorageAdapter;
use crate::utils::error::{AppError, AppResult};
use crate::VERSION;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub profiles: Arc<ProfileService>,
    pub setup: Arc<SetupService>,
    pub integration: Arc<IntegrationService>,
    pub tokens: Arc<TokenService>,
    pub storage: Arc<dyn StorageAdapter>,
}

/// Register a new account
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<SignUpResponse>)> {
    let response = state.accounts.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Verify the caller's email with an OTP; email comes from the bearer token
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<VerifyOtpRequest>,
) -> AppResult<Json<VerifyResponse>> {
    let response = state.accounts.verify_otp(&user.0.email, request).await?;
    Ok(Json(response))
}

/// Sign in; unverified accounts get the USER_UNVERIFIED marker with 403
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> AppResult<Response> {
    match state.accounts.sign_in(request).await? {
        SignInOutcome::Verified(response) => Ok(Json(*response).into_response()),
        SignInOutcome::Unverified(response) => {
            Ok((StatusCode::FORBIDDEN, Json(response)).into_response())
        }
    }
}

/// Rotate and resend the OTP for an email
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(request): Json<ResendOtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    let response = state.accounts.resend_otp(request).await?;
    Ok(Json(response))
}

/// Start the password-reset flow
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ForgotPasswordResponse>> {
    let response = state.accounts.forgot_password(request).await?;
    Ok(Json(response))
}

/// Replace the password credential
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let response = state.accounts.reset_password(request).await?;
    Ok(Json(response))
}

/// Verify a reset-purpose OTP, keyed by email in the body
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyResetOtpRequest>,
) -> AppResult<Json<VerifyResponse>> {
    let response = state.accounts.verify_reset_otp(request).await?;
    Ok(Json(response))
}

/// Mint a third-party access token for the external HR system
pub async fn integration_token(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    let token = state.integration.mint_access_token().await?;
    Ok(Json(token))
}

/// Fetch the caller's applicant profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApplicantProfile>> {
    let profile = state
        .profiles
        .get(&user.0.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not created yet".to_string()))?;
    Ok(Json(profile))
}

/// Create or update the caller's applicant profile
pub async fn put_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ProfileInput>,
) -> AppResult<Json<ApplicantProfile>> {
    let profile = state.profiles.upsert(&user.0.email, input).await?;
    Ok(Json(profile))
}

/// Read the portal setup record (defaults before one is saved)
pub async fn get_setup(State(state): State<AppState>) -> AppResult<Json<AppSetup>> {
    let setup = state.setup.get().await?;
    Ok(Json(setup))
}

/// Save the portal setup record
pub async fn put_setup(
    State(state): State<AppState>,
    Json(changes): Json<AppSetupChanges>,
) -> AppResult<Json<AppSetup>> {
    let setup = state.setup.save(changes).await?;
    Ok(Json(setup))
}

/// Health check: reports storage liveness
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthCheckResponse>> {
    let storage_ok = state.storage.check_connection().await;

    Ok(Json(HealthCheckResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        storage: storage_ok,
        version: VERSION.to_string(),
    }))
}
