//! Security Utilities
//!
//! Credential primitives: salt generation, salted password hashing, and
//! one-time-passcode issuance. Pure functions; the only I/O is the bcrypt
//! primitive itself.
//!
//! OTPs are encrypted with the same salted-hash primitive as passwords,
//! keyed by the account's own password salt. That reuse is a compatibility
//! requirement of the stored data, not a cryptographic one.

use bcrypt::{hash_with_salt, BcryptError, Version, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};

/// bcrypt cost factor for password and OTP hashing
pub const BCRYPT_COST: u32 = DEFAULT_COST;

/// Salt length in bytes; bcrypt consumes exactly 16
pub const SALT_LEN: usize = 16;

/// OTP lifetime from issuance
pub const OTP_TTL_MINUTES: i64 = 30;

/// A freshly issued one-time passcode and its expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpIssue {
    /// Six-decimal-digit code
    pub code: u32,
    pub expires_at: DateTime<Utc>,
}

/// Generate a fresh random salt suitable for salted hashing
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

fn salt_bytes(salt: &str) -> [u8; SALT_LEN] {
    let mut bytes = [0u8; SALT_LEN];
    for (dst, src) in bytes.iter_mut().zip(salt.as_bytes()) {
        *dst = *src;
    }
    bytes
}

/// Hash a password with an explicit salt; deterministic given same inputs
pub fn hash_password(password: &str, salt: &str) -> Result<String, BcryptError> {
    hash_with_salt(password, BCRYPT_COST, salt_bytes(salt))
        .map(|parts| parts.format_for_version(Version::TwoB))
}

/// Verify a password by recomputing the salted hash and comparing
pub fn validate_password(entered: &str, stored_hash: &str, salt: &str) -> bool {
    match hash_password(entered, salt) {
        Ok(recomputed) => constant_time_compare(&recomputed, stored_hash),
        Err(_) => false,
    }
}

/// Generate a one-time passcode that renders as exactly six decimal digits,
/// expiring [`OTP_TTL_MINUTES`] from now
pub fn generate_otp() -> OtpIssue {
    let mut rng = rand::thread_rng();
    let code = loop {
        let candidate: u32 = rng.gen_range(0..1_000_000);
        // reject values that would print with fewer than six digits
        if candidate >= 100_000 {
            break candidate;
        }
    };

    OtpIssue {
        code,
        expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
    }
}

/// Encrypt an OTP with the account's salt, using the password primitive
pub fn encrypt_otp(code: u32, salt: &str) -> Result<String, BcryptError> {
    hash_password(&code.to_string(), salt)
}

/// Check a submitted OTP against the stored encrypted secret
pub fn validate_otp(code: u32, stored_secret: &str, salt: &str) -> bool {
    validate_password(&code.to_string(), stored_secret, salt)
}

/// Timing-safe string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.bytes().zip(b.bytes()) {
        result |= byte_a ^ byte_b;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_salt() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();

        assert_eq!(salt1.len(), SALT_LEN);
        assert_eq!(salt2.len(), SALT_LEN);
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_generate_otp_six_digits() {
        for _ in 0..256 {
            let issue = generate_otp();
            assert_eq!(issue.code.to_string().len(), 6);
            assert!((100_000..1_000_000).contains(&issue.code));
        }
    }

    #[test]
    fn test_generate_otp_expiry() {
        let before = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        let issue = generate_otp();
        let after = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        assert!(issue.expires_at >= before);
        assert!(issue.expires_at <= after);
    }

    #[test]
    fn test_password_hashing_deterministic() {
        let salt = generate_salt();
        let hash1 = hash_password("secret1", &salt).unwrap();
        let hash2 = hash_password("secret1", &salt).unwrap();

        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_password_validation() {
        let salt = generate_salt();
        let hash = hash_password("secret1", &salt).unwrap();

        assert!(validate_password("secret1", &hash, &salt));
        assert!(!validate_password("secret2", &hash, &salt));
        assert!(!validate_password("secret1", &hash, &generate_salt()));
    }

    #[test]
    fn test_otp_roundtrip_with_password_salt() {
        let salt = generate_salt();
        let issue = generate_otp();
        let secret = encrypt_otp(issue.code, &salt).unwrap();

        assert!(validate_otp(issue.code, &secret, &salt));

        let wrong = if issue.code == 999_999 {
            issue.code - 1
        } else {
            issue.code + 1
        };
        assert!(!validate_otp(wrong, &secret, &salt));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hello_world"));
    }

}
