use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Import error: {0:#}")]
    Import(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    /// Filters out potentially sensitive information
    pub fn log_safe(&self) -> String {
        match self {
            // Database errors might contain sensitive schema information
            Error::Database(_) => "Database operation failed".to_string(),
            Error::Migration(_) => "Database migration failed".to_string(),

            // HTTP errors might contain internal URLs or authentication info
            Error::Http(_) => "External HTTP request failed".to_string(),

            // Token and hash errors never carry anything useful for the log reader
            Error::Token(_) => "Access token operation failed".to_string(),
            Error::PasswordHash(_) => "Password hashing failed".to_string(),

            // Internal errors might contain sensitive details
            Error::Internal(msg) => {
                // Filter out common sensitive patterns
                if msg.to_lowercase().contains("password")
                    || msg.to_lowercase().contains("secret")
                    || msg.to_lowercase().contains("token")
                    || msg.to_lowercase().contains("key")
                {
                    "Internal error (details redacted)".to_string()
                } else {
                    format!("Internal error: {msg}")
                }
            }

            // These errors are generally safe to log as-is
            Error::Import(e) => format!("Import error: {e:#}"),
            Error::Io(_) => "File system operation failed".to_string(),
            Error::Config(msg) => format!("Configuration error: {msg}"),
            Error::NotFound(msg) => format!("Not found: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
            Error::Unauthorized(msg) => format!("Unauthorized: {msg}"),
            Error::Forbidden(msg) => format!("Forbidden: {msg}"),
            Error::Conflict(msg) => format!("Conflict: {msg}"),
        }
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) | Error::Conflict(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

// Implement IntoResponse for API error handling
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log the full error internally using the safe logging method
        tracing::error!("Request error: {}", self.log_safe());

        let status = self.status_code();
        let error_message = match &self {
            Error::NotFound(msg)
            | Error::Validation(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::Conflict(msg) => msg.clone(),
            Error::Database(_) => "Database error".to_string(),
            Error::Http(_) => "External service error".to_string(),
            _ => "Internal server error".to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        // Duplicate registrations are reported as plain bad requests
        assert_eq!(
            Error::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_log_safe_redacts_secrets() {
        let err = Error::Internal("bad SECRET_KEY".to_string());
        assert_eq!(err.log_safe(), "Internal error (details redacted)");

        let err = Error::Internal("disk full".to_string());
        assert_eq!(err.log_safe(), "Internal error: disk full");
    }
}
