//! Portal Setup Service
//!
//! Read and save the single portal setup/theming record. Before an
//! administrator saves one, defaults are served.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{AppSetup, AppSetupChanges};
use crate::storage::StorageAdapter;
use crate::utils::error::{AppError, AppResult};

pub struct SetupService {
    storage: Arc<dyn StorageAdapter>,
}

impl SetupService {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    pub async fn get(&self) -> AppResult<AppSetup> {
        Ok(self
            .storage
            .find_app_setup()
            .await?
            .unwrap_or_else(AppSetup::defaults))
    }

    /// Create the record on first save, update it afterwards
    pub async fn save(&self, changes: AppSetupChanges) -> AppResult<AppSetup> {
        changes
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid setup data: {}", e)))?;

        match self.storage.find_app_setup().await? {
            Some(existing) => Ok(self
                .storage
                .update_app_setup(&existing.setup_id, changes)
                .await?),
            None => {
                let setup = changes.apply(AppSetup::defaults(), Utc::now());
                Ok(self.storage.create_app_setup(setup).await?)
            }
        }
    }
}
