//! Recruitment Portal Identity Service
//!
//! The identity and account-verification core of the recruitment portal:
//! account registration, one-time-passcode issuance and validation,
//! sign-in gated on verification state, password reset, and bearer-token
//! issuance. All persistence goes through a storage-engine-agnostic
//! adapter that runs unmodified against PostgreSQL or MongoDB.
//!
//! # Features
//!
//! - **Account lifecycle**: sign-up, OTP verify, gated sign-in, OTP
//!   resend, forgot/reset password
//! - **Dual storage backends**: one adapter contract, two engines with
//!   identical externally-observable behavior
//! - **Bearer tokens**: signed HS256 claims (`id`, `email`, `verified`),
//!   no server-side session store
//! - **Salted credentials**: explicit-salt bcrypt hashing shared by
//!   passwords and OTPs
//! - **HTTP API**: axum endpoints assembled through a configurable
//!   RouterBuilder
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use recruit_identity::{
//!     api::{AppState, RouterBuilder},
//!     config::AppConfig,
//!     service::{
//!         AccountService, IntegrationService, LogMailer, ProfileService, SetupService,
//!         TokenService,
//!     },
//!     storage,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!
//!     let adapter = storage::init_storage(&config.storage).await?;
//!     let tokens = TokenService::new(&config.token);
//!     let mailer = Arc::new(LogMailer);
//!
//!     let state = AppState {
//!         accounts: Arc::new(AccountService::new(
//!             adapter.clone(),
//!             mailer,
//!             tokens.clone(),
//!         )),
//!         profiles: Arc::new(ProfileService::new(adapter.clone())),
//!         setup: Arc::new(SetupService::new(adapter.clone())),
//!         integration: Arc::new(IntegrationService::new(adapter.clone())?),
//!         tokens: Arc::new(tokens),
//!         storage: adapter,
//!     };
//!
//!     let app = RouterBuilder::with_all_routes().build(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: axum handlers, configurable routes, auth middleware
//! - **Service Layer**: the account lifecycle state machine plus token,
//!   email, profile, setup, and HR-integration services
//! - **Storage Layer**: the `StorageAdapter` contract, a construct-once
//!   factory, and the PostgreSQL and MongoDB implementations
//! - **Models**: stored entities and request/response payloads
//! - **Utils**: error taxonomy, credential primitives, validation

/// HTTP API layer with handlers, middleware, and configurable routing
pub mod api;

/// Environment-driven configuration
pub mod config;

/// Stored entities and request/response payloads
pub mod models;

/// Business logic: account lifecycle, tokens, email, profiles, setup
pub mod service;

/// Persistence adapter contract, factory, and both engine implementations
pub mod storage;

/// Shared utilities for errors, credentials, and validation
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{AppState, RouterBuilder};
pub use models::{Account, AccountView, ApplicantProfile, TokenClaims};
pub use service::{
    AccountService, IntegrationService, LogMailer, Mailer, ProfileService, SetupService,
    SmtpMailer, TokenService,
};
pub use storage::{init_storage, storage, StorageAdapter, StorageError};
pub use utils::error::{AppError, AppResult, ErrorResponse};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
