//! Storage Layer
//!
//! Engine-agnostic persistence adapter. Business logic depends only on the
//! [`StorageAdapter`] trait; the PostgreSQL and MongoDB implementations
//! must produce identical externally-observable behavior (error kinds,
//! uniqueness guarantees, generated ids, timestamps) despite their
//! different native semantics.

pub mod mongo;
pub mod postgres;

#[cfg(test)]
pub mod memory;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StorageConfig;
use crate::models::{
    Account, AccountChanges, AppSetup, AppSetupChanges, ApplicantProfile, IntegrationConfig,
    NewAccount, ProfileInput,
};

pub use mongo::MongoAdapter;
pub use postgres::PostgresAdapter;

/// Normalized storage failure; engine-native errors never cross this layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Uniqueness violation, primarily a duplicate email
    #[error("duplicate key")]
    Duplicate,

    /// Update/fetch target absent where presence was required; `find_*`
    /// operations signal expected absence with `Ok(None)` instead
    #[error("record not found")]
    NotFound,

    /// Any other engine failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Capability contract both storage engines satisfy
///
/// Each logical entity gets find/create/update operations returning the
/// stored representation, with `Ok(None)` for expected absence. One adapter
/// instance exists per process and is shared across all requests; every
/// operation is self-contained, so concurrent use is safe.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    // recruitment_user
    async fn find_account_by_email(&self, email: &str) -> StorageResult<Option<Account>>;
    async fn find_account_by_id(&self, id: i64) -> StorageResult<Option<Account>>;
    /// Fails with [`StorageError::Duplicate`] if the email is already taken;
    /// the engine's uniqueness constraint is the final arbiter
    async fn create_account(&self, data: NewAccount) -> StorageResult<Account>;
    async fn update_account_by_email(
        &self,
        email: &str,
        changes: AccountChanges,
    ) -> StorageResult<Account>;
    async fn update_account_by_id(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> StorageResult<Account>;

    // applicant_profile
    async fn find_profile(&self, email: &str) -> StorageResult<Option<ApplicantProfile>>;
    /// Sets `last_modified` if the input carries none
    async fn create_profile(&self, profile: ApplicantProfile) -> StorageResult<ApplicantProfile>;
    async fn update_profile(
        &self,
        email: &str,
        input: ProfileInput,
    ) -> StorageResult<ApplicantProfile>;

    // bc_configs (read-only from this core)
    async fn find_integration_config(&self, id: &str)
        -> StorageResult<Option<IntegrationConfig>>;
    async fn find_first_integration_config(&self) -> StorageResult<Option<IntegrationConfig>>;

    // app_setup
    async fn find_app_setup(&self) -> StorageResult<Option<AppSetup>>;
    async fn create_app_setup(&self, setup: AppSetup) -> StorageResult<AppSetup>;
    async fn update_app_setup(
        &self,
        setup_id: &str,
        changes: AppSetupChanges,
    ) -> StorageResult<AppSetup>;

    // liveness / diagnostics
    async fn check_connection(&self) -> bool;
    async fn query_raw(&self, query: &str) -> StorageResult<serde_json::Value>;
}

/// Construct-once cell guarding the single adapter instance per process
///
/// Prevents two live connection pools to two different engines coexisting
/// by accident: installing twice fails, and reading before installation
/// fails loudly instead of silently constructing a second instance.
pub struct AdapterCell {
    inner: OnceLock<Arc<dyn StorageAdapter>>,
}

impl AdapterCell {
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Install the adapter; fails if one is already installed
    pub fn install(&self, adapter: Arc<dyn StorageAdapter>) -> StorageResult<()> {
        self.inner
            .set(adapter)
            .map_err(|_| StorageError::Backend("storage adapter already initialized".to_string()))
    }

    /// Fetch the installed adapter; fails if none has been installed
    pub fn get(&self) -> StorageResult<Arc<dyn StorageAdapter>> {
        self.inner
            .get()
            .cloned()
            .ok_or_else(|| StorageError::Backend("storage adapter not initialized".to_string()))
    }
}

impl Default for AdapterCell {
    fn default() -> Self {
        Self::new()
    }
}

static ADAPTER: AdapterCell = AdapterCell::new();

/// Construct the adapter selected by configuration, connect it, and install
/// it as the process-wide instance
pub async fn init_storage(config: &StorageConfig) -> StorageResult<Arc<dyn StorageAdapter>> {
    let adapter: Arc<dyn StorageAdapter> = match config {
        StorageConfig::Postgres(pg) => {
            log::info!("storage engine: postgres");
            Arc::new(PostgresAdapter::connect(pg).await?)
        }
        StorageConfig::Mongo(mongo) => {
            log::info!("storage engine: mongo");
            Arc::new(MongoAdapter::connect(mongo).await?)
        }
    };

    ADAPTER.install(adapter.clone())?;
    Ok(adapter)
}

/// Fetch the process-wide adapter; fails loudly before [`init_storage`]
pub fn storage() -> StorageResult<Arc<dyn StorageAdapter>> {
    ADAPTER.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryAdapter;

    #[test]
    fn test_cell_get_before_install_fails() {
        let cell = AdapterCell::new();
        let err = cell.get().err().unwrap();
        assert!(matches!(err, StorageError::Backend(_)));
    }

    #[test]
    fn test_global_accessor_fails_before_init() {
        // no test initializes the process-global adapter, so the accessor
        // must fail loudly rather than construct one
        assert!(storage().is_err());
    }

    #[test]
    fn test_cell_double_install_fails() {
        let cell = AdapterCell::new();
        cell.install(Arc::new(MemoryAdapter::new())).unwrap();

        let err = cell.install(Arc::new(MemoryAdapter::new())).unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));

        assert!(cell.get().is_ok());
    }
}
