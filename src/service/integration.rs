//! External HR System Integration
//!
//! Pass-through access to the OAuth-protected OData endpoint of the HR/ERP
//! system. This core only mints third-party access tokens from the stored
//! integration config and reports the configured company identifier; all
//! job/application data lives behind that endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::models::{IntegrationConfig, DEFAULT_INTEGRATION_ID};
use crate::storage::StorageAdapter;
use crate::utils::error::{AppError, AppResult};

pub struct IntegrationService {
    storage: Arc<dyn StorageAdapter>,
    http_client: HttpClient,
}

impl IntegrationService {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            storage,
            http_client,
        })
    }

    /// Active integration config: the well-known id first, else the first
    /// stored record
    async fn active_config(&self) -> AppResult<IntegrationConfig> {
        let config = match self
            .storage
            .find_integration_config(DEFAULT_INTEGRATION_ID)
            .await?
        {
            Some(config) => Some(config),
            None => self.storage.find_first_integration_config().await?,
        };

        config.ok_or_else(|| AppError::NotFound("Integration config not found".to_string()))
    }

    /// Mint a third-party access token via the client-credentials grant and
    /// pass the token endpoint's JSON straight through
    pub async fn mint_access_token(&self) -> AppResult<serde_json::Value> {
        let config = self.active_config().await?;

        let params = [
            ("grant_type", "client_credentials".to_string()),
            ("client_id", config.client_id),
            ("client_secret", config.client_secret),
            ("scope", format!("{}/.default", config.base_url)),
        ];

        let response = self
            .http_client
            .post(&config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("token endpoint unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::ExternalService(format!("malformed token response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryAdapter;

    #[tokio::test]
    async fn test_missing_config_is_not_found() {
        let service = IntegrationService::new(Arc::new(MemoryAdapter::new())).unwrap();
        let err = service.mint_access_token().await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_falls_back_to_first_config() {
        let storage = Arc::new(MemoryAdapter::new());
        storage
            .seed_integration_config(IntegrationConfig {
                id: "tenant-xyz".to_string(),
                base_url: "https://erp.example.com/odata".to_string(),
                tenant_id: "tenant".to_string(),
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                token_url: "https://login.example.com/token".to_string(),
                company_id: "CRONUS".to_string(),
            })
            .await;

        let service = IntegrationService::new(storage).unwrap();
        let config = service.active_config().await.unwrap();
        assert_eq!(config.id, "tenant-xyz");
    }
}
