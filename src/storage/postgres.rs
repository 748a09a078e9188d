//! Relational Storage Adapter
//!
//! PostgreSQL implementation of [`StorageAdapter`]. Uniqueness and the
//! auto-incrementing account id are native to the engine (`UNIQUE` index on
//! email, `BIGSERIAL` id); duplicate-email failures are detected through
//! the driver's structured unique-violation kind, never by matching error
//! message text.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, QueryBuilder};

use crate::config::PostgresConfig;
use crate::models::{
    Account, AccountChanges, AppSetup, AppSetupChanges, ApplicantProfile, IntegrationConfig,
    NewAccount, ProfileInput,
};
use crate::storage::{StorageAdapter, StorageError, StorageResult};

const ACCOUNT_COLUMNS: &str = "id, email, full_name, password_hash, password_salt, otp_secret, \
     otp_expiry, verified, profile_created, reset_token, reset_token_expiry, created_at, updated_at";

const PROFILE_COLUMNS: &str = "email, first_name, middle_name, last_name, phone, date_of_birth, \
     birth_place, national_id, tax_id, gender, marital_status, address_line1, address_line2, \
     city, postal_code, country, relative_in_org, last_modified";

/// PostgreSQL-backed adapter
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Connect a pool against the configured database
    pub async fn connect(config: &PostgresConfig) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Self { pool })
    }

    /// Build an adapter over an existing pool (tests, embedding)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_account_where(
        &self,
        column: &str,
        bind_email: Option<&str>,
        bind_id: Option<i64>,
        changes: AccountChanges,
    ) -> StorageResult<Account> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("UPDATE recruitment_user SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(full_name) = &changes.full_name {
            qb.push(", full_name = ").push_bind(full_name.clone());
        }
        if let Some(password_hash) = &changes.password_hash {
            qb.push(", password_hash = ").push_bind(password_hash.clone());
        }
        if let Some(password_salt) = &changes.password_salt {
            qb.push(", password_salt = ").push_bind(password_salt.clone());
        }
        if let Some(otp_secret) = &changes.otp_secret {
            qb.push(", otp_secret = ").push_bind(otp_secret.clone());
        }
        if let Some(otp_expiry) = changes.otp_expiry {
            qb.push(", otp_expiry = ").push_bind(otp_expiry);
        }
        if let Some(verified) = changes.verified {
            qb.push(", verified = ").push_bind(verified);
        }
        if let Some(profile_created) = changes.profile_created {
            qb.push(", profile_created = ").push_bind(profile_created);
        }

        qb.push(format!(" WHERE {} = ", column));
        if let Some(email) = bind_email {
            qb.push_bind(email.to_string());
        } else if let Some(id) = bind_id {
            qb.push_bind(id);
        }
        qb.push(format!(" RETURNING {}", ACCOUNT_COLUMNS));

        qb.build_query_as::<Account>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl StorageAdapter for PostgresAdapter {
    async fn find_account_by_email(&self, email: &str) -> StorageResult<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM recruitment_user WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_account_by_id(&self, id: i64) -> StorageResult<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM recruitment_user WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_account(&self, data: NewAccount) -> StorageResult<Account> {
        sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO recruitment_user \
                 (email, full_name, password_hash, password_salt, otp_secret, otp_expiry, \
                  verified, profile_created, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, FALSE, NOW(), NOW()) \
             RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(&data.email)
        .bind(&data.full_name)
        .bind(&data.password_hash)
        .bind(&data.password_salt)
        .bind(&data.otp_secret)
        .bind(data.otp_expiry)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_account_by_email(
        &self,
        email: &str,
        changes: AccountChanges,
    ) -> StorageResult<Account> {
        self.update_account_where("email", Some(email), None, changes)
            .await
    }

    async fn update_account_by_id(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> StorageResult<Account> {
        self.update_account_where("id", None, Some(id), changes)
            .await
    }

    async fn find_profile(&self, email: &str) -> StorageResult<Option<ApplicantProfile>> {
        sqlx::query_as::<_, ApplicantProfile>(&format!(
            "SELECT {} FROM applicant_profile WHERE email = $1",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_profile(&self, profile: ApplicantProfile) -> StorageResult<ApplicantProfile> {
        sqlx::query_as::<_, ApplicantProfile>(&format!(
            "INSERT INTO applicant_profile \
                 (email, first_name, middle_name, last_name, phone, date_of_birth, birth_place, \
                  national_id, tax_id, gender, marital_status, address_line1, address_line2, \
                  city, postal_code, country, relative_in_org, last_modified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.middle_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(profile.date_of_birth)
        .bind(&profile.birth_place)
        .bind(&profile.national_id)
        .bind(&profile.tax_id)
        .bind(&profile.gender)
        .bind(&profile.marital_status)
        .bind(&profile.address_line1)
        .bind(&profile.address_line2)
        .bind(&profile.city)
        .bind(&profile.postal_code)
        .bind(&profile.country)
        .bind(profile.relative_in_org)
        .bind(profile.last_modified)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_profile(
        &self,
        email: &str,
        input: ProfileInput,
    ) -> StorageResult<ApplicantProfile> {
        sqlx::query_as::<_, ApplicantProfile>(&format!(
            "UPDATE applicant_profile SET \
                 first_name = $2, middle_name = $3, last_name = $4, phone = $5, \
                 date_of_birth = $6, birth_place = $7, national_id = $8, tax_id = $9, \
                 gender = $10, marital_status = $11, address_line1 = $12, address_line2 = $13, \
                 city = $14, postal_code = $15, country = $16, relative_in_org = $17, \
                 last_modified = $18 \
             WHERE email = $1 \
             RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .bind(&input.first_name)
        .bind(&input.middle_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(input.date_of_birth)
        .bind(&input.birth_place)
        .bind(&input.national_id)
        .bind(&input.tax_id)
        .bind(&input.gender)
        .bind(&input.marital_status)
        .bind(&input.address_line1)
        .bind(&input.address_line2)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(input.relative_in_org)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StorageError::NotFound)
    }

    async fn find_integration_config(
        &self,
        id: &str,
    ) -> StorageResult<Option<IntegrationConfig>> {
        sqlx::query_as::<_, IntegrationConfig>(
            "SELECT id, base_url, tenant_id, client_id, client_secret, token_url, company_id \
             FROM bc_configs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_first_integration_config(&self) -> StorageResult<Option<IntegrationConfig>> {
        sqlx::query_as::<_, IntegrationConfig>(
            "SELECT id, base_url, tenant_id, client_id, client_secret, token_url, company_id \
             FROM bc_configs ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_app_setup(&self) -> StorageResult<Option<AppSetup>> {
        sqlx::query_as::<_, AppSetup>(
            "SELECT setup_id, portal_name, logo_url, primary_color, allow_signups, updated_at \
             FROM app_setup ORDER BY setup_id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_app_setup(&self, setup: AppSetup) -> StorageResult<AppSetup> {
        sqlx::query_as::<_, AppSetup>(
            "INSERT INTO app_setup (setup_id, portal_name, logo_url, primary_color, allow_signups, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING setup_id, portal_name, logo_url, primary_color, allow_signups, updated_at",
        )
        .bind(&setup.setup_id)
        .bind(&setup.portal_name)
        .bind(&setup.logo_url)
        .bind(&setup.primary_color)
        .bind(setup.allow_signups)
        .bind(setup.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_app_setup(
        &self,
        setup_id: &str,
        changes: AppSetupChanges,
    ) -> StorageResult<AppSetup> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("UPDATE app_setup SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(portal_name) = &changes.portal_name {
            qb.push(", portal_name = ").push_bind(portal_name.clone());
        }
        if let Some(logo_url) = &changes.logo_url {
            qb.push(", logo_url = ").push_bind(logo_url.clone());
        }
        if let Some(primary_color) = &changes.primary_color {
            qb.push(", primary_color = ").push_bind(primary_color.clone());
        }
        if let Some(allow_signups) = changes.allow_signups {
            qb.push(", allow_signups = ").push_bind(allow_signups);
        }

        qb.push(" WHERE setup_id = ").push_bind(setup_id.to_string());
        qb.push(
            " RETURNING setup_id, portal_name, logo_url, primary_color, allow_signups, updated_at",
        );

        qb.build_query_as::<AppSetup>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(StorageError::NotFound)
    }

    async fn check_connection(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn query_raw(&self, query: &str) -> StorageResult<serde_json::Value> {
        let result = sqlx::query(query)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(serde_json::json!({ "rows_affected": result.rows_affected() }))
    }
}

/// Normalize a driver error into the engine-independent taxonomy
fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StorageError::Duplicate,
        other => StorageError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_normalization() {
        assert_eq!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::NotFound
        );
    }

    #[test]
    fn test_other_errors_become_backend() {
        let err = map_sqlx_error(sqlx::Error::PoolClosed);
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
