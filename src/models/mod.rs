//! Data Models Module
//!
//! Entities stored through the persistence adapter plus the HTTP
//! request/response payloads and token claims.

pub mod account;
pub mod auth;
pub mod profile;
pub mod requests;
pub mod setup;

// Re-export commonly used types
pub use account::{Account, AccountChanges, AccountView, NewAccount};
pub use auth::TokenClaims;
pub use profile::{ApplicantProfile, ProfileInput};
pub use requests::*;
pub use setup::{AppSetup, AppSetupChanges, IntegrationConfig, DEFAULT_INTEGRATION_ID};
