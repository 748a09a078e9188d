//! Document Storage Adapter
//!
//! MongoDB implementation of [`StorageAdapter`]. The document engine lacks
//! two relational behaviors the contract requires, so this adapter emulates
//! them:
//!
//! - auto-incrementing integer account ids: on insert, the current maximum
//!   id is read (sorted descending, projected to the id field) and the new
//!   document gets `max + 1`. The read-then-write window is serialized
//!   behind a per-process mutex; concurrent inserts from *different*
//!   processes can still collide, unlike the relational engine's native
//!   sequence.
//! - email uniqueness: declared as a unique index at connect time; the
//!   server's duplicate-key code (11000) is normalized to the same
//!   [`StorageError::Duplicate`] the relational adapter produces.
//!
//! Profiles use the email directly as the document `_id`, fixed at insert.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::{NaiveDate, Utc};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::MongoConfig;
use crate::models::{
    Account, AccountChanges, AppSetup, AppSetupChanges, ApplicantProfile, IntegrationConfig,
    NewAccount, ProfileInput,
};
use crate::storage::{StorageAdapter, StorageError, StorageResult};

const ACCOUNTS: &str = "recruitment_user";
const PROFILES: &str = "applicant_profile";
const BC_CONFIGS: &str = "bc_configs";
const APP_SETUP: &str = "app_setup";

/// MongoDB-backed adapter
pub struct MongoAdapter {
    db: Database,
    accounts: Collection<AccountDocument>,
    profiles: Collection<ProfileDocument>,
    bc_configs: Collection<IntegrationConfigDocument>,
    app_setup: Collection<AppSetupDocument>,
    /// Serializes the read-max-then-insert id assignment within this process
    id_lock: Mutex<()>,
}

impl MongoAdapter {
    /// Connect, and declare the unique email index the contract relies on
    pub async fn connect(config: &MongoConfig) -> StorageResult<Self> {
        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(map_mongo_error)?;
        let db = client.database(&config.database);

        let accounts = db.collection::<AccountDocument>(ACCOUNTS);
        accounts
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await
            .map_err(map_mongo_error)?;

        Ok(Self {
            accounts,
            profiles: db.collection::<ProfileDocument>(PROFILES),
            bc_configs: db.collection::<IntegrationConfigDocument>(BC_CONFIGS),
            app_setup: db.collection::<AppSetupDocument>(APP_SETUP),
            db,
            id_lock: Mutex::new(()),
        })
    }

    /// Highest assigned account id, or 0 when the collection is empty
    async fn current_max_id(&self) -> StorageResult<i64> {
        let raw: Collection<Document> = self.db.collection(ACCOUNTS);
        let top = raw
            .find_one(doc! {})
            .sort(doc! { "id": -1 })
            .projection(doc! { "id": 1 })
            .await
            .map_err(map_mongo_error)?;

        Ok(top
            .and_then(|document| document.get_i64("id").ok())
            .unwrap_or(0))
    }
}

#[async_trait]
impl StorageAdapter for MongoAdapter {
    async fn find_account_by_email(&self, email: &str) -> StorageResult<Option<Account>> {
        let found = self
            .accounts
            .find_one(doc! { "email": email })
            .await
            .map_err(map_mongo_error)?;

        Ok(found.map(Account::from))
    }

    async fn find_account_by_id(&self, id: i64) -> StorageResult<Option<Account>> {
        let found = self
            .accounts
            .find_one(doc! { "id": id })
            .await
            .map_err(map_mongo_error)?;

        Ok(found.map(Account::from))
    }

    async fn create_account(&self, data: NewAccount) -> StorageResult<Account> {
        // Hold the lock across read-max and insert; see the module docs for
        // the cross-process window that remains.
        let _guard = self.id_lock.lock().await;

        let id = self.current_max_id().await? + 1;
        let document = AccountDocument::new(id, data);

        self.accounts
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;

        Ok(Account::from(document))
    }

    async fn update_account_by_email(
        &self,
        email: &str,
        changes: AccountChanges,
    ) -> StorageResult<Account> {
        let updated = self
            .accounts
            .find_one_and_update(
                doc! { "email": email },
                doc! { "$set": account_changes_document(changes) },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?;

        updated.map(Account::from).ok_or(StorageError::NotFound)
    }

    async fn update_account_by_id(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> StorageResult<Account> {
        let updated = self
            .accounts
            .find_one_and_update(
                doc! { "id": id },
                doc! { "$set": account_changes_document(changes) },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?;

        updated.map(Account::from).ok_or(StorageError::NotFound)
    }

    async fn find_profile(&self, email: &str) -> StorageResult<Option<ApplicantProfile>> {
        let found = self
            .profiles
            .find_one(doc! { "_id": email })
            .await
            .map_err(map_mongo_error)?;

        Ok(found.map(ApplicantProfile::from))
    }

    async fn create_profile(&self, profile: ApplicantProfile) -> StorageResult<ApplicantProfile> {
        let document = ProfileDocument::from(profile);

        self.profiles
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;

        Ok(ApplicantProfile::from(document))
    }

    async fn update_profile(
        &self,
        email: &str,
        input: ProfileInput,
    ) -> StorageResult<ApplicantProfile> {
        let replacement = ProfileDocument::from(input.into_profile(email, Utc::now()));

        let updated = self
            .profiles
            .find_one_and_replace(doc! { "_id": email }, &replacement)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?;

        updated
            .map(ApplicantProfile::from)
            .ok_or(StorageError::NotFound)
    }

    async fn find_integration_config(
        &self,
        id: &str,
    ) -> StorageResult<Option<IntegrationConfig>> {
        let found = self
            .bc_configs
            .find_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?;

        Ok(found.map(IntegrationConfig::from))
    }

    async fn find_first_integration_config(&self) -> StorageResult<Option<IntegrationConfig>> {
        let found = self
            .bc_configs
            .find_one(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(map_mongo_error)?;

        Ok(found.map(IntegrationConfig::from))
    }

    async fn find_app_setup(&self) -> StorageResult<Option<AppSetup>> {
        let found = self
            .app_setup
            .find_one(doc! {})
            .await
            .map_err(map_mongo_error)?;

        Ok(found.map(AppSetup::from))
    }

    async fn create_app_setup(&self, setup: AppSetup) -> StorageResult<AppSetup> {
        let document = AppSetupDocument::from(setup);

        self.app_setup
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;

        Ok(AppSetup::from(document))
    }

    async fn update_app_setup(
        &self,
        setup_id: &str,
        changes: AppSetupChanges,
    ) -> StorageResult<AppSetup> {
        let mut set = doc! { "updated_at": Bson::DateTime(bson::DateTime::now()) };
        if let Some(portal_name) = changes.portal_name {
            set.insert("portal_name", portal_name);
        }
        if let Some(logo_url) = changes.logo_url {
            set.insert("logo_url", logo_url);
        }
        if let Some(primary_color) = changes.primary_color {
            set.insert("primary_color", primary_color);
        }
        if let Some(allow_signups) = changes.allow_signups {
            set.insert("allow_signups", allow_signups);
        }

        let updated = self
            .app_setup
            .find_one_and_update(doc! { "_id": setup_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?;

        updated.map(AppSetup::from).ok_or(StorageError::NotFound)
    }

    async fn check_connection(&self) -> bool {
        self.db.run_command(doc! { "ping": 1 }).await.is_ok()
    }

    async fn query_raw(&self, query: &str) -> StorageResult<serde_json::Value> {
        let command: serde_json::Value = serde_json::from_str(query)
            .map_err(|e| StorageError::Backend(format!("invalid raw command: {}", e)))?;
        let command = bson::to_document(&command)
            .map_err(|e| StorageError::Backend(format!("invalid raw command: {}", e)))?;

        let reply = self
            .db
            .run_command(command)
            .await
            .map_err(map_mongo_error)?;

        serde_json::to_value(&reply).map_err(|e| StorageError::Backend(e.to_string()))
    }
}

/// Normalize a driver error; duplicate-key detection is structural (server
/// code 11000), never message matching
fn map_mongo_error(err: mongodb::error::Error) -> StorageError {
    use mongodb::error::{ErrorKind, WriteFailure};

    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000 => {
            StorageError::Duplicate
        }
        ErrorKind::Command(command_error) if command_error.code == 11000 => {
            StorageError::Duplicate
        }
        _ => StorageError::Backend(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Document representations
//
// BSON-native field types (bson::DateTime, date strings) live only here;
// the rest of the crate sees the chrono-typed models.
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct AccountDocument {
    id: i64,
    email: String,
    full_name: String,
    password_hash: String,
    password_salt: String,
    otp_secret: Option<String>,
    otp_expiry: Option<bson::DateTime>,
    verified: bool,
    profile_created: bool,
    reset_token: Option<String>,
    reset_token_expiry: Option<bson::DateTime>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl AccountDocument {
    fn new(id: i64, data: NewAccount) -> Self {
        let now = bson::DateTime::now();
        Self {
            id,
            email: data.email,
            full_name: data.full_name,
            password_hash: data.password_hash,
            password_salt: data.password_salt,
            otp_secret: data.otp_secret,
            otp_expiry: data.otp_expiry.map(bson::DateTime::from_chrono),
            verified: false,
            profile_created: false,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<AccountDocument> for Account {
    fn from(document: AccountDocument) -> Self {
        Account {
            id: document.id,
            email: document.email,
            full_name: document.full_name,
            password_hash: document.password_hash,
            password_salt: document.password_salt,
            otp_secret: document.otp_secret,
            otp_expiry: document.otp_expiry.map(|dt| dt.to_chrono()),
            verified: document.verified,
            profile_created: document.profile_created,
            reset_token: document.reset_token,
            reset_token_expiry: document.reset_token_expiry.map(|dt| dt.to_chrono()),
            created_at: document.created_at.to_chrono(),
            updated_at: document.updated_at.to_chrono(),
        }
    }
}

fn account_changes_document(changes: AccountChanges) -> Document {
    let mut set = doc! { "updated_at": Bson::DateTime(bson::DateTime::now()) };

    if let Some(full_name) = changes.full_name {
        set.insert("full_name", full_name);
    }
    if let Some(password_hash) = changes.password_hash {
        set.insert("password_hash", password_hash);
    }
    if let Some(password_salt) = changes.password_salt {
        set.insert("password_salt", password_salt);
    }
    if let Some(otp_secret) = changes.otp_secret {
        set.insert("otp_secret", otp_secret);
    }
    if let Some(otp_expiry) = changes.otp_expiry {
        set.insert("otp_expiry", bson::DateTime::from_chrono(otp_expiry));
    }
    if let Some(verified) = changes.verified {
        set.insert("verified", verified);
    }
    if let Some(profile_created) = changes.profile_created {
        set.insert("profile_created", profile_created);
    }

    set
}

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize)]
struct ProfileDocument {
    /// The account email doubles as the document identity
    #[serde(rename = "_id")]
    email: String,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    phone: Option<String>,
    date_of_birth: Option<String>,
    birth_place: Option<String>,
    national_id: Option<String>,
    tax_id: Option<String>,
    gender: Option<String>,
    marital_status: Option<String>,
    address_line1: Option<String>,
    address_line2: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    relative_in_org: bool,
    last_modified: bson::DateTime,
}

impl From<ApplicantProfile> for ProfileDocument {
    fn from(profile: ApplicantProfile) -> Self {
        Self {
            email: profile.email,
            first_name: profile.first_name,
            middle_name: profile.middle_name,
            last_name: profile.last_name,
            phone: profile.phone,
            date_of_birth: profile
                .date_of_birth
                .map(|d| d.format(DATE_FORMAT).to_string()),
            birth_place: profile.birth_place,
            national_id: profile.national_id,
            tax_id: profile.tax_id,
            gender: profile.gender,
            marital_status: profile.marital_status,
            address_line1: profile.address_line1,
            address_line2: profile.address_line2,
            city: profile.city,
            postal_code: profile.postal_code,
            country: profile.country,
            relative_in_org: profile.relative_in_org,
            last_modified: bson::DateTime::from_chrono(profile.last_modified),
        }
    }
}

impl From<ProfileDocument> for ApplicantProfile {
    fn from(document: ProfileDocument) -> Self {
        ApplicantProfile {
            email: document.email,
            first_name: document.first_name,
            middle_name: document.middle_name,
            last_name: document.last_name,
            phone: document.phone,
            date_of_birth: document
                .date_of_birth
                .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
            birth_place: document.birth_place,
            national_id: document.national_id,
            tax_id: document.tax_id,
            gender: document.gender,
            marital_status: document.marital_status,
            address_line1: document.address_line1,
            address_line2: document.address_line2,
            city: document.city,
            postal_code: document.postal_code,
            country: document.country,
            relative_in_org: document.relative_in_org,
            last_modified: document.last_modified.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IntegrationConfigDocument {
    #[serde(rename = "_id")]
    id: String,
    base_url: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    token_url: String,
    company_id: String,
}

impl From<IntegrationConfigDocument> for IntegrationConfig {
    fn from(document: IntegrationConfigDocument) -> Self {
        IntegrationConfig {
            id: document.id,
            base_url: document.base_url,
            tenant_id: document.tenant_id,
            client_id: document.client_id,
            client_secret: document.client_secret,
            token_url: document.token_url,
            company_id: document.company_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AppSetupDocument {
    #[serde(rename = "_id")]
    setup_id: String,
    portal_name: String,
    logo_url: Option<String>,
    primary_color: Option<String>,
    allow_signups: bool,
    updated_at: bson::DateTime,
}

impl From<AppSetup> for AppSetupDocument {
    fn from(setup: AppSetup) -> Self {
        Self {
            setup_id: setup.setup_id,
            portal_name: setup.portal_name,
            logo_url: setup.logo_url,
            primary_color: setup.primary_color,
            allow_signups: setup.allow_signups,
            updated_at: bson::DateTime::from_chrono(setup.updated_at),
        }
    }
}

impl From<AppSetupDocument> for AppSetup {
    fn from(document: AppSetupDocument) -> Self {
        AppSetup {
            setup_id: document.setup_id,
            portal_name: document.portal_name,
            logo_url: document.logo_url,
            primary_color: document.primary_color,
            allow_signups: document.allow_signups,
            updated_at: document.updated_at.to_chrono(),
        }
    }
}
