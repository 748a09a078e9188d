//! In-Memory Storage Adapter
//!
//! Test-only implementation of [`StorageAdapter`] backed by hash maps. Id
//! assignment mirrors the document engine's max+1 emulation so the service
//! tests exercise the same observable id behavior as both real engines.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::{
    Account, AccountChanges, AppSetup, AppSetupChanges, ApplicantProfile, IntegrationConfig,
    NewAccount, ProfileInput,
};
use crate::storage::{StorageAdapter, StorageError, StorageResult};

#[derive(Default)]
struct MemoryState {
    accounts: Vec<Account>,
    profiles: HashMap<String, ApplicantProfile>,
    bc_configs: Vec<IntegrationConfig>,
    app_setup: Option<AppSetup>,
}

/// Hash-map-backed adapter for tests
#[derive(Default)]
pub struct MemoryAdapter {
    state: Mutex<MemoryState>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an integration config, as a deployment script would
    pub async fn seed_integration_config(&self, config: IntegrationConfig) {
        self.state.lock().await.bc_configs.push(config);
    }
}

fn apply_changes(account: &mut Account, changes: AccountChanges) {
    if let Some(full_name) = changes.full_name {
        account.full_name = full_name;
    }
    if let Some(password_hash) = changes.password_hash {
        account.password_hash = password_hash;
    }
    if let Some(password_salt) = changes.password_salt {
        account.password_salt = password_salt;
    }
    if let Some(otp_secret) = changes.otp_secret {
        account.otp_secret = Some(otp_secret);
    }
    if let Some(otp_expiry) = changes.otp_expiry {
        account.otp_expiry = Some(otp_expiry);
    }
    if let Some(verified) = changes.verified {
        account.verified = verified;
    }
    if let Some(profile_created) = changes.profile_created {
        account.profile_created = profile_created;
    }
    account.updated_at = Utc::now();
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn find_account_by_email(&self, email: &str) -> StorageResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_id(&self, id: i64) -> StorageResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn create_account(&self, data: NewAccount) -> StorageResult<Account> {
        let mut state = self.state.lock().await;

        if state.accounts.iter().any(|a| a.email == data.email) {
            return Err(StorageError::Duplicate);
        }

        let id = state.accounts.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let account = Account {
            id,
            email: data.email,
            full_name: data.full_name,
            password_hash: data.password_hash,
            password_salt: data.password_salt,
            otp_secret: data.otp_secret,
            otp_expiry: data.otp_expiry,
            verified: false,
            profile_created: false,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        };

        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn update_account_by_email(
        &self,
        email: &str,
        changes: AccountChanges,
    ) -> StorageResult<Account> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.email == email)
            .ok_or(StorageError::NotFound)?;

        apply_changes(account, changes);
        Ok(account.clone())
    }

    async fn update_account_by_id(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> StorageResult<Account> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StorageError::NotFound)?;

        apply_changes(account, changes);
        Ok(account.clone())
    }

    async fn find_profile(&self, email: &str) -> StorageResult<Option<ApplicantProfile>> {
        let state = self.state.lock().await;
        Ok(state.profiles.get(email).cloned())
    }

    async fn create_profile(&self, profile: ApplicantProfile) -> StorageResult<ApplicantProfile> {
        let mut state = self.state.lock().await;

        if state.profiles.contains_key(&profile.email) {
            return Err(StorageError::Duplicate);
        }

        state
            .profiles
            .insert(profile.email.clone(), profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        email: &str,
        input: ProfileInput,
    ) -> StorageResult<ApplicantProfile> {
        let mut state = self.state.lock().await;

        if !state.profiles.contains_key(email) {
            return Err(StorageError::NotFound);
        }

        let profile = input.into_profile(email, Utc::now());
        state.profiles.insert(email.to_string(), profile.clone());
        Ok(profile)
    }

    async fn find_integration_config(
        &self,
        id: &str,
    ) -> StorageResult<Option<IntegrationConfig>> {
        let state = self.state.lock().await;
        Ok(state.bc_configs.iter().find(|c| c.id == id).cloned())
    }

    async fn find_first_integration_config(&self) -> StorageResult<Option<IntegrationConfig>> {
        let state = self.state.lock().await;
        Ok(state.bc_configs.first().cloned())
    }

    async fn find_app_setup(&self) -> StorageResult<Option<AppSetup>> {
        let state = self.state.lock().await;
        Ok(state.app_setup.clone())
    }

    async fn create_app_setup(&self, setup: AppSetup) -> StorageResult<AppSetup> {
        let mut state = self.state.lock().await;

        if state.app_setup.is_some() {
            return Err(StorageError::Duplicate);
        }

        state.app_setup = Some(setup.clone());
        Ok(setup)
    }

    async fn update_app_setup(
        &self,
        setup_id: &str,
        changes: AppSetupChanges,
    ) -> StorageResult<AppSetup> {
        let mut state = self.state.lock().await;
        let current = match &state.app_setup {
            Some(setup) if setup.setup_id == setup_id => setup.clone(),
            _ => return Err(StorageError::NotFound),
        };

        let updated = changes.apply(current, Utc::now());
        state.app_setup = Some(updated.clone());
        Ok(updated)
    }

    async fn check_connection(&self) -> bool {
        true
    }

    async fn query_raw(&self, _query: &str) -> StorageResult<serde_json::Value> {
        Ok(serde_json::json!({ "ok": 1 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            full_name: "Test Person".to_string(),
            password_hash: "hash".to_string(),
            password_salt: "salt".to_string(),
            otp_secret: None,
            otp_expiry: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_from_one() {
        let adapter = MemoryAdapter::new();

        let first = adapter.create_account(new_account("a@x.com")).await.unwrap();
        let second = adapter.create_account(new_account("b@x.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let adapter = MemoryAdapter::new();
        adapter.create_account(new_account("a@x.com")).await.unwrap();

        let err = adapter
            .create_account(new_account("a@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::Duplicate);
    }

    #[tokio::test]
    async fn test_find_absent_is_none_not_error() {
        let adapter = MemoryAdapter::new();
        assert!(adapter
            .find_account_by_email("missing@x.com")
            .await
            .unwrap()
            .is_none());
        assert!(adapter.find_profile("missing@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_matches_find_by_email() {
        let adapter = MemoryAdapter::new();
        let created = adapter.create_account(new_account("a@x.com")).await.unwrap();

        let by_id = adapter
            .find_account_by_id(created.id)
            .await
            .unwrap()
            .unwrap();
        let by_email = adapter
            .find_account_by_email("a@x.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(by_id.id, by_email.id);
        assert_eq!(by_id.email, by_email.email);
        assert!(adapter.find_account_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_diagnostics() {
        let adapter = MemoryAdapter::new();
        assert!(adapter.check_connection().await);

        let reply = adapter.query_raw("{\"ping\": 1}").await.unwrap();
        assert_eq!(reply["ok"], 1);
    }

    #[tokio::test]
    async fn test_update_absent_is_not_found() {
        let adapter = MemoryAdapter::new();
        let err = adapter
            .update_account_by_email("missing@x.com", AccountChanges::default())
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::NotFound);
    }
}
