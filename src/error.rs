//! Error types for Koffan.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`) used as the `error` field of API bodies
//! - Conventional HTTP status per code (400, 401, 404, 500, 503)
//! - Category-based exit codes for the CLI (2=db, 3=not_found, 4=validation, ...)
//! - Context-aware recovery hints

use std::path::PathBuf;
use thiserror::Error;

use crate::transfer::TransferError;

/// Result type alias for Koffan operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    DatabaseError,

    // Not Found (exit 3)
    NotFound,

    // Validation (exit 4)
    InvalidId,
    InvalidJson,
    ValidationError,
    InvalidConfirmation,
    ImportInvalid,

    // Auth (exit 5)
    ApiDisabled,
    MissingToken,
    InvalidFormat,
    InvalidToken,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Snake-case code string carried in the `error` field of API bodies.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::DatabaseError => "db_error",
            Self::NotFound => "not_found",
            Self::InvalidId => "invalid_id",
            Self::InvalidJson => "invalid_json",
            Self::ValidationError => "validation_error",
            Self::InvalidConfirmation => "invalid_confirmation",
            Self::ImportInvalid => "invalid_import",
            Self::ApiDisabled => "api_disabled",
            Self::MissingToken => "missing_token",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidToken => "invalid_token",
            Self::ConfigError => "config_error",
            Self::IoError => "io_error",
            Self::InternalError => "internal_error",
        }
    }

    /// HTTP status code for this category.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidId
            | Self::InvalidJson
            | Self::ValidationError
            | Self::InvalidConfirmation
            | Self::ImportInvalid => 400,
            Self::MissingToken | Self::InvalidFormat | Self::InvalidToken => 401,
            Self::NotFound => 404,
            Self::ApiDisabled => 503,
            Self::NotInitialized
            | Self::DatabaseError
            | Self::ConfigError
            | Self::IoError
            | Self::InternalError => 500,
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::DatabaseError => 2,
            Self::NotFound => 3,
            Self::InvalidId
            | Self::InvalidJson
            | Self::ValidationError
            | Self::InvalidConfirmation
            | Self::ImportInvalid => 4,
            Self::ApiDisabled | Self::MissingToken | Self::InvalidFormat | Self::InvalidToken => 5,
            Self::ConfigError => 7,
            Self::IoError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Koffan operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `koffan init` first")]
    NotInitialized,

    #[error("Database already exists at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("List not found: {id}")]
    ListNotFound { id: i64 },

    #[error("Section not found: {id}")]
    SectionNotFound { id: i64 },

    #[error("Target section not found: {id}")]
    TargetSectionNotFound { id: i64 },

    #[error("Item not found: {id}")]
    ItemNotFound { id: i64 },

    #[error("History entry not found: {id}")]
    HistoryNotFound { id: i64 },

    #[error("Template not found: {id}")]
    TemplateNotFound { id: i64 },

    #[error("Invalid {entity} ID")]
    InvalidId { entity: &'static str },

    #[error("Failed to parse request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    Validation(String),

    #[error("Confirmation word must be DELETE")]
    InvalidConfirmation,

    #[error("API is not enabled on this server")]
    ApiDisabled,

    #[error("Authorization header is required")]
    MissingToken,

    #[error("Authorization header must be in format: Bearer <token>")]
    InvalidAuthFormat,

    #[error("Invalid API token")]
    InvalidToken,

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized | Self::AlreadyInitialized { .. } => ErrorCode::NotInitialized,
            Self::ListNotFound { .. }
            | Self::SectionNotFound { .. }
            | Self::TargetSectionNotFound { .. }
            | Self::ItemNotFound { .. }
            | Self::HistoryNotFound { .. }
            | Self::TemplateNotFound { .. } => ErrorCode::NotFound,
            Self::InvalidId { .. } => ErrorCode::InvalidId,
            Self::InvalidBody(_) | Self::Json(_) => ErrorCode::InvalidJson,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::InvalidConfirmation => ErrorCode::InvalidConfirmation,
            Self::ApiDisabled => ErrorCode::ApiDisabled,
            Self::MissingToken => ErrorCode::MissingToken,
            Self::InvalidAuthFormat => ErrorCode::InvalidFormat,
            Self::InvalidToken => ErrorCode::InvalidToken,
            Self::Transfer(e) => {
                if e.is_input_error() {
                    ErrorCode::ImportInvalid
                } else {
                    ErrorCode::DatabaseError
                }
            }
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// HTTP status, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.error_code().http_status()
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `koffan init` to create the database".to_string())
            }
            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),
            Self::ApiDisabled => Some(
                "Set API_TOKEN on the server and pass the same value with --token".to_string(),
            ),
            Self::MissingToken | Self::InvalidToken | Self::InvalidAuthFormat => {
                Some("Pass the operator token with --token or KOFFAN_TOKEN".to_string())
            }
            Self::ListNotFound { .. } => {
                Some("Use `koffan list ls` to see available lists.".to_string())
            }
            Self::InvalidConfirmation => {
                Some("Type DELETE exactly (upper case) to confirm".to_string())
            }
            _ => None,
        }
    }

    /// The `{error, message}` body returned to API callers.
    #[must_use]
    pub fn to_api_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.error_code().as_str(),
            "message": self.api_message(),
        })
    }

    /// Structured JSON for CLI consumers (adds exit code and hint).
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "status": code.http_status(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }

    /// Message shown to API callers. Persistence failures are not echoed verbatim.
    fn api_message(&self) -> String {
        match self {
            Self::Database(e) => {
                tracing::warn!(error = %e, "database failure surfaced to caller");
                "Database operation failed".to_string()
            }
            Self::ListNotFound { .. } => "List not found".to_string(),
            Self::SectionNotFound { .. } => "Section not found".to_string(),
            Self::TargetSectionNotFound { .. } => "Target section not found".to_string(),
            Self::ItemNotFound { .. } => "Item not found".to_string(),
            Self::HistoryNotFound { .. } => "History entry not found".to_string(),
            Self::TemplateNotFound { .. } => "Template not found".to_string(),
            Self::InvalidBody(_) => "Failed to parse request body".to_string(),
            other => other.to_string(),
        }
    }
}
