//! Authentication Middleware
//!
//! Bearer-token validation for protected endpoints. The raw header value
//! goes through the token service's quote-and-scheme stripping; any
//! failure is a uniform 401, never a panic or a distinguishable error.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::models::TokenClaims;
use crate::service::TokenService;
use crate::utils::error::AppError;

/// Extension type carrying the verified claims of the calling user
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenClaims);

/// Validates the bearer token and stores the claims in request extensions
///
/// Any failure (missing header, unparseable value, bad signature, expiry)
/// yields 401 Unauthorized without detail about which factor failed.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    let claims = tokens
        .from_header(auth_header)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;

    request.extensions_mut().insert(AuthUser(claims));

    Ok(next.run(request).await)
}
