//! Service Layer
//!
//! Business logic for the identity core: the account lifecycle state
//! machine, token issuance, outbound email, applicant profiles, portal
//! setup, and the external HR system pass-through.

pub mod account;
pub mod email;
pub mod integration;
pub mod profile;
pub mod setup;
pub mod token;

// Re-export services
pub use account::AccountService;
pub use email::{LogMailer, Mailer, SmtpMailer};
pub use integration::IntegrationService;
pub use profile::ProfileService;
pub use setup::SetupService;
pub use token::TokenService;
