//! Command implementations.
//!
//! Every command goes through the same [`Api`] handlers a server would use:
//! arguments are turned into request bodies, and the response body is printed
//! as JSON or rendered for a terminal.

pub mod clear;
pub mod completions;
pub mod history;
pub mod init;
pub mod item;
pub mod list;
pub mod section;
pub mod template;
pub mod transfer;
pub mod version;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{Api, ApiResponse, bearer_header};
use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Global options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub db: Option<&'a Path>,
    pub token: Option<&'a str>,
    pub json: bool,
    pub quiet: bool,
}

impl Context<'_> {
    /// Resolve configuration for this invocation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no database location can be determined.
    pub fn config(&self) -> Result<AppConfig> {
        AppConfig::from_env(self.db)
    }

    /// Open the handlers over an initialized database.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` if the database file does not exist.
    pub fn open(&self) -> Result<Api> {
        let config = self.config()?;
        if !config.db_path.exists() {
            return Err(Error::NotInitialized);
        }
        Api::open(config)
    }

    /// Open the handlers and check `--token` against the operator token.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when the gated API is disabled or the
    /// token does not match.
    pub fn open_gated(&self) -> Result<Api> {
        let api = self.open()?;
        let header = self.token.map(bearer_header);
        api.authorize(header.as_deref())?;
        Ok(api)
    }

    /// Print `response` as JSON, or hand its body to `human`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be decoded for `human`.
    pub fn emit<T, F>(&self, response: &ApiResponse, human: F) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnOnce(T),
    {
        let body = response.json_body().cloned().unwrap_or(Value::Null);
        if self.json {
            println!("{}", serde_json::to_string(&body)?);
        } else if !self.quiet {
            human(serde_json::from_value(body)?);
        }
        Ok(())
    }

    /// Print a confirmation for a body-less response.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn done(&self, message: &str, value: impl Serialize) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(&value)?);
        } else if !self.quiet {
            println!("{message}");
        }
        Ok(())
    }
}

/// Encode a request body for a handler.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn request(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Pull a field out of a wrapping object, e.g. `{"lists": [...]}`.
///
/// # Errors
///
/// Returns an error if the field does not decode as `T`.
pub fn field<T: DeserializeOwned>(body: &Value, name: &str) -> Result<T> {
    Ok(serde_json::from_value(body.get(name).cloned().unwrap_or(Value::Null))?)
}

/// Millisecond timestamp formatted for display.
#[must_use]
pub fn format_time(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
