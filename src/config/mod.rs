use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_SECRET_KEY: &str = "supersecret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub api_rate_limit: u64,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub media_dir: PathBuf,
    pub media_url: String,
    pub max_upload_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub api_max_limit: i64,
    pub default_limit: i64,
}

/// Read an environment variable, falling back to `default` when unset
fn parse_env<T: FromStr>(key: &str, default: &str) -> Result<T> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {key} value")))
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/feedandeat.db".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env("PORT", "8000")?;
        let external_url = std::env::var("EXTERNAL_URL").ok();
        let api_rate_limit = parse_env("API_RATE_LIMIT", "100")?;
        let max_request_body_size = parse_env("MAX_REQUEST_BODY_SIZE", "10485760")?;

        let max_connections = parse_env("DATABASE_MAX_CONNECTIONS", "25")?;
        let min_connections = parse_env("DATABASE_MIN_CONNECTIONS", "5")?;
        let connection_timeout_seconds = parse_env("DATABASE_CONNECTION_TIMEOUT", "30")?;
        let idle_timeout_seconds = parse_env("DATABASE_IDLE_TIMEOUT", "600")?;

        let secret_key =
            std::env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string());
        let access_token_expire_minutes = parse_env("ACCESS_TOKEN_EXPIRE_MINUTES", "60")?;
        let bcrypt_cost = parse_env("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?;

        let media_dir = std::env::var("MEDIA_DIR")
            .unwrap_or_else(|_| "media".to_string())
            .into();
        let media_url = std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string());
        let max_upload_size = parse_env("MAX_UPLOAD_SIZE", "5242880")?;

        let api_max_limit = parse_env("API_MAX_LIMIT", "100")?;
        let default_limit = parse_env("DEFAULT_LIMIT", "20")?;

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                external_url,
                api_rate_limit,
                max_request_body_size,
            },
            auth: AuthConfig {
                secret_key,
                access_token_expire_minutes,
                bcrypt_cost,
            },
            media: MediaConfig {
                media_dir,
                media_url: media_url.trim_end_matches('/').to_string(),
                max_upload_size,
            },
            pagination: PaginationConfig {
                api_max_limit,
                default_limit,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.auth.secret_key.is_empty() {
            return Err(Error::Config("SECRET_KEY must not be empty".to_string()));
        }

        if self.auth.access_token_expire_minutes <= 0 {
            return Err(Error::Config(
                "Access token lifetime must be positive".to_string(),
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(Error::Config(
                "BCRYPT_COST must be between 4 and 31".to_string(),
            ));
        }

        if self.pagination.api_max_limit <= 0 {
            return Err(Error::Config("API max limit must be positive".to_string()));
        }

        if self.pagination.default_limit < 0
            || self.pagination.default_limit > self.pagination.api_max_limit
        {
            return Err(Error::Config(
                "Default limit must lie within the API max limit".to_string(),
            ));
        }

        if self.auth.secret_key == DEFAULT_SECRET_KEY {
            warn!("SECRET_KEY is not set, tokens are signed with the built-in development key");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 5,
                min_connections: 2,
                connection_timeout_seconds: 30,
                idle_timeout_seconds: 600,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                external_url: None,
                api_rate_limit: 100,
                max_request_body_size: 10485760,
            },
            auth: AuthConfig {
                secret_key: "test-secret".to_string(),
                access_token_expire_minutes: 60,
                bcrypt_cost: 4,
            },
            media: MediaConfig {
                media_dir: "/tmp/media".into(),
                media_url: "/media".to_string(),
                max_upload_size: 5242880,
            },
            pagination: PaginationConfig {
                api_max_limit: 100,
                default_limit: 20,
            },
        }
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = settings();
        assert!(settings.validate().is_ok());

        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_auth_validation() {
        let mut settings = settings();
        settings.auth.secret_key = String::new();
        assert!(settings.validate().is_err());

        let mut settings = self::settings();
        settings.auth.access_token_expire_minutes = 0;
        assert!(settings.validate().is_err());

        let mut settings = self::settings();
        settings.auth.bcrypt_cost = 3;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_pagination_validation() {
        let mut settings = settings();
        settings.pagination.default_limit = 101;
        assert!(settings.validate().is_err());

        settings.pagination.api_max_limit = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_secret_key_is_not_serialized() {
        let json = serde_json::to_string(&settings()).unwrap();
        assert!(!json.contains("test-secret"));
    }
}
