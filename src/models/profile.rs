//! Applicant Profile Model
//!
//! One-to-one biodata extension of an account, keyed by email. Absence of
//! a profile is a normal state until the applicant creates one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored applicant biodata record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicantProfile {
    /// Account email; also the profile's identity
    pub email: String,

    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,

    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,

    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    /// Whether the applicant has a relative in the organisation
    pub relative_in_org: bool,

    pub last_modified: DateTime<Utc>,
}

/// Write shape for creating or updating a profile
///
/// `last_modified` is assigned by the storage layer; the email comes from
/// the authenticated caller, never the body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub birth_place: Option<String>,
    #[validate(length(max = 64))]
    pub national_id: Option<String>,
    #[validate(length(max = 64))]
    pub tax_id: Option<String>,
    #[validate(length(max = 16))]
    pub gender: Option<String>,
    #[validate(length(max = 32))]
    pub marital_status: Option<String>,

    #[validate(length(max = 255))]
    pub address_line1: Option<String>,
    #[validate(length(max = 255))]
    pub address_line2: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 16))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,

    #[serde(default)]
    pub relative_in_org: bool,
}

impl ProfileInput {
    /// Materialize a full record for the given account email
    pub fn into_profile(self, email: &str, now: DateTime<Utc>) -> ApplicantProfile {
        ApplicantProfile {
            email: email.to_string(),
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            birth_place: self.birth_place,
            national_id: self.national_id,
            tax_id: self.tax_id,
            gender: self.gender,
            marital_status: self.marital_status,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            relative_in_org: self.relative_in_org,
            last_modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_materialization() {
        let input = ProfileInput {
            first_name: "Ada".to_string(),
            middle_name: None,
            last_name: "Obi".to_string(),
            phone: Some("+2348000000".to_string()),
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
            country: Some("NG".to_string()),
            relative_in_org: true,
        };

        let now = Utc::now();
        let profile = input.into_profile("ada@x.com", now);

        assert_eq!(profile.email, "ada@x.com");
        assert_eq!(profile.first_name, "Ada");
        assert!(profile.relative_in_org);
        assert_eq!(profile.last_modified, now);
    }
}
