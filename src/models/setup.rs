//! Integration and Portal Setup Models
//!
//! `IntegrationConfig` holds the opaque credentials of the external HR/ERP
//! system (read-only from this core); `AppSetup` is the portal's single
//! setup/theming record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Well-known id under which the active integration config is stored
pub const DEFAULT_INTEGRATION_ID: &str = "default";

/// External-system credentials keyed by a well-known string id
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IntegrationConfig {
    pub id: String,

    /// OData service base URL of the HR system
    pub base_url: String,

    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,

    /// OAuth token endpoint used to mint third-party access tokens
    pub token_url: String,

    /// Company identifier returned to clients at verified sign-in
    pub company_id: String,
}

/// Portal setup record; a deployment has at most one
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppSetup {
    pub setup_id: String,
    pub portal_name: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub allow_signups: bool,
    pub updated_at: DateTime<Utc>,
}

impl AppSetup {
    /// Defaults served before an administrator saves a setup record
    pub fn defaults() -> Self {
        Self {
            setup_id: "portal".to_string(),
            portal_name: "Recruitment Portal".to_string(),
            logo_url: None,
            primary_color: None,
            allow_signups: true,
            updated_at: Utc::now(),
        }
    }
}

/// Partial update for the setup record; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AppSetupChanges {
    #[validate(length(min = 1, max = 100))]
    pub portal_name: Option<String>,
    #[validate(length(max = 512))]
    pub logo_url: Option<String>,
    #[validate(length(max = 16))]
    pub primary_color: Option<String>,
    pub allow_signups: Option<bool>,
}

impl AppSetupChanges {
    /// Apply to an existing record, producing the stored result
    pub fn apply(self, mut setup: AppSetup, now: DateTime<Utc>) -> AppSetup {
        if let Some(portal_name) = self.portal_name {
            setup.portal_name = portal_name;
        }
        if let Some(logo_url) = self.logo_url {
            setup.logo_url = Some(logo_url);
        }
        if let Some(primary_color) = self.primary_color {
            setup.primary_color = Some(primary_color);
        }
        if let Some(allow_signups) = self.allow_signups {
            setup.allow_signups = allow_signups;
        }
        setup.updated_at = now;
        setup
    }
}
