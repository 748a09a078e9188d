//! Configuration Module
//!
//! Environment-driven configuration for the identity service: the storage
//! engine switch, connection strings, token signing secret, server binding,
//! and SMTP settings. Business logic never reads the environment directly.

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }

    /// Get required environment variable or fail with a named error
    pub fn get_required(key: &str) -> anyhow::Result<String> {
        env::var(key).map_err(|_| anyhow::anyhow!("required environment variable {} is not set", key))
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub token: TokenConfig,
    pub email: Option<EmailConfig>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Storage engine selection plus the matching connection settings
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Postgres(PostgresConfig),
    Mongo(MongoConfig),
}

/// Relational engine settings
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Document engine settings
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

/// Bearer token signing configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub expires_days: i64,
}

/// SMTP settings for outbound OTP and reset emails
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl AppConfig {
    /// Load the full configuration from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env(),
            storage: StorageConfig::from_env()?,
            token: TokenConfig::from_env()?,
            email: EmailConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 4000),
        }
    }
}

impl StorageConfig {
    /// Read the engine selector (`STORAGE_ENGINE`: `postgres` | `mongo`)
    /// and the matching connection settings
    pub fn from_env() -> anyhow::Result<Self> {
        let engine = env::get_string("STORAGE_ENGINE", "postgres");
        match engine.as_str() {
            "postgres" => Ok(Self::Postgres(PostgresConfig {
                url: env::get_required("DATABASE_URL")?,
                max_connections: env::get_u32("DB_MAX_CONNECTIONS", 10),
            })),
            "mongo" => Ok(Self::Mongo(MongoConfig {
                url: env::get_required("MONGO_URL")?,
                database: env::get_string("MONGO_DATABASE", "recruitment"),
            })),
            other => anyhow::bail!(
                "unknown STORAGE_ENGINE '{}' (expected 'postgres' or 'mongo')",
                other
            ),
        }
    }
}

impl TokenConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            secret: env::get_required("TOKEN_SECRET")?,
            expires_days: env::get_i64("TOKEN_EXPIRES_DAYS", 90),
        })
    }
}

impl EmailConfig {
    /// `None` when SMTP is not configured; the mailer then logs instead of
    /// sending, which keeps local development usable
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        if !env::is_set("SMTP_HOST") {
            return Ok(None);
        }

        Ok(Some(Self {
            smtp_host: env::get_required("SMTP_HOST")?,
            smtp_port: env::get_u16("SMTP_PORT", 587),
            smtp_username: env::get_required("SMTP_USERNAME")?,
            smtp_password: env::get_required("SMTP_PASSWORD")?,
            from_email: env::get_required("SMTP_FROM_EMAIL")?,
            from_name: env::get_string("SMTP_FROM_NAME", "Recruitment Portal"),
        }))
    }
}
