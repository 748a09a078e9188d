//! Applicant Profile Service
//!
//! Biodata handling for the signed-in applicant. A missing profile is a
//! normal state; the first write creates the record and flips the
//! account's `profile_created` flag.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{AccountChanges, ApplicantProfile, ProfileInput};
use crate::storage::StorageAdapter;
use crate::utils::error::{AppError, AppResult};

pub struct ProfileService {
    storage: Arc<dyn StorageAdapter>,
}

impl ProfileService {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Fetch the applicant's profile; `None` until one has been created
    pub async fn get(&self, email: &str) -> AppResult<Option<ApplicantProfile>> {
        Ok(self.storage.find_profile(email).await?)
    }

    /// Create the profile on first write, update in place afterwards
    pub async fn upsert(&self, email: &str, input: ProfileInput) -> AppResult<ApplicantProfile> {
        input
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid profile data: {}", e)))?;

        if self.storage.find_profile(email).await?.is_some() {
            return Ok(self.storage.update_profile(email, input).await?);
        }

        let profile = input.into_profile(email, Utc::now());
        let created = self.storage.create_profile(profile).await?;

        self.storage
            .update_account_by_email(
                email,
                AccountChanges {
                    profile_created: Some(true),
                    ..AccountChanges::default()
                },
            )
            .await?;

        log::info!("profile created for {}", email);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAccount;
    use crate::storage::memory::MemoryAdapter;

    fn input(first: &str) -> ProfileInput {
        ProfileInput {
            first_name: first.to_string(),
            middle_name: None,
            last_name: "Obi".to_string(),
            phone: None,
            date_of_birth: None,
            birth_place: None,
            national_id: None,
            tax_id: None,
            gender: None,
            marital_status: None,
            address_line1: None,
            address_line2: None,
            city: None,
            postal_code: None,
            country: None,
            relative_in_org: false,
        }
    }

    async fn storage_with_account() -> Arc<MemoryAdapter> {
        let storage = Arc::new(MemoryAdapter::new());
        storage
            .create_account(NewAccount {
                email: "ada@x.com".to_string(),
                full_name: "Ada Obi".to_string(),
                password_hash: "h".to_string(),
                password_salt: "s".to_string(),
                otp_secret: None,
                otp_expiry: None,
            })
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_absent_profile_is_none() {
        let storage = storage_with_account().await;
        let service = ProfileService::new(storage);

        assert!(service.get("ada@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_write_creates_and_flags_account() {
        let storage = storage_with_account().await;
        let service = ProfileService::new(storage.clone());

        let created = service.upsert("ada@x.com", input("Ada")).await.unwrap();
        assert_eq!(created.first_name, "Ada");
        assert_eq!(created.email, "ada@x.com");

        let account = storage
            .find_account_by_email("ada@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(account.profile_created);
    }

    #[tokio::test]
    async fn test_second_write_updates_in_place() {
        let storage = storage_with_account().await;
        let service = ProfileService::new(storage.clone());

        service.upsert("ada@x.com", input("Ada")).await.unwrap();
        let updated = service.upsert("ada@x.com", input("Adaeze")).await.unwrap();

        assert_eq!(updated.first_name, "Adaeze");
        assert_eq!(
            service
                .get("ada@x.com")
                .await
                .unwrap()
                .unwrap()
                .first_name,
            "Adaeze"
        );
    }
}
