//! Request handlers, independent of any HTTP framework.
//!
//! Each handler takes the raw parts of a request (path parameters as strings,
//! JSON bodies as bytes, uploads as [`Upload`]) and returns an [`ApiResponse`]
//! carrying a status code and a body. Errors become `{error, message}` bodies
//! through [`ApiResponse::from_error`].
//!
//! Section, item, and history handlers are meant to sit behind
//! [`Api::authorize`]; list, template, transfer, database, and version
//! handlers serve the first-party client and are not gated.
//!
//! Every successful mutation publishes an [`Event`](crate::broadcast::Event).

mod auth;
mod database;
mod history;
mod items;
mod lists;
mod sections;
mod templates;
mod transfer;
mod version;

pub use auth::{authorize, bearer_header};
pub use database::ClearRequest;
pub use history::{BatchDeleteHistoryRequest, CreateHistoryRequest};
pub use items::{CreateItemRequest, MoveItemRequest, UpdateItemRequest};
pub use lists::{CreateListRequest, UpdateListRequest};
pub use sections::{CreateSectionRequest, UpdateSectionRequest};
pub use templates::{
    AddTemplateItemRequest, ApplyTemplateRequest, CreateTemplateRequest,
};
pub use transfer::{ExportQuery, ImportForm, Upload};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::broadcast::Broadcaster;
use crate::config::{AppConfig, HTTP_TIMEOUT, build_version};
use crate::error::{Error, Result};
use crate::release::{GithubTags, ReleaseSource, VersionChecker};
use crate::storage::SqliteStorage;
use crate::transfer::ExportFile;

/// Body of an [`ApiResponse`].
#[derive(Debug, Clone)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    File(ExportFile),
}

/// Status code and body produced by a handler.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl ApiResponse {
    /// JSON body with the given status.
    pub fn json(status: u16, value: impl Serialize) -> Result<Self> {
        Ok(Self {
            status,
            body: Body::Json(serde_json::to_value(value)?),
        })
    }

    /// 200 with a JSON body.
    pub fn ok(value: impl Serialize) -> Result<Self> {
        Self::json(200, value)
    }

    /// 201 with a JSON body.
    pub fn created(value: impl Serialize) -> Result<Self> {
        Self::json(201, value)
    }

    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            status: 204,
            body: Body::Empty,
        }
    }

    /// 200 with a file download.
    #[must_use]
    pub const fn file(file: ExportFile) -> Self {
        Self {
            status: 200,
            body: Body::File(file),
        }
    }

    /// `{error, message}` with the status of the error's code.
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        Self {
            status: err.http_status(),
            body: Body::Json(err.to_api_json()),
        }
    }

    /// Collapse a handler result into a response.
    #[must_use]
    pub fn from_result(result: Result<Self>) -> Self {
        result.unwrap_or_else(|e| Self::from_error(&e))
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The JSON body, if any.
    #[must_use]
    pub const fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Parse a positive integer path parameter.
///
/// # Errors
///
/// Returns `Error::InvalidId` naming `entity` if `raw` is not a positive integer.
pub fn parse_id(raw: &str, entity: &'static str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(Error::InvalidId { entity })
}

/// Decode a JSON request body.
///
/// # Errors
///
/// Returns `Error::InvalidBody` if the body is not valid JSON for `T`.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        Error::InvalidBody(e.to_string())
    })
}

/// Handler state: the store, the live-update channel, and the update checker.
pub struct Api<S = GithubTags> {
    config: AppConfig,
    storage: SqliteStorage,
    events: Broadcaster,
    versions: VersionChecker<S>,
}

impl Api<GithubTags> {
    /// Open the database named by `config` and check releases against GitHub.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: AppConfig) -> Result<Self> {
        let storage = SqliteStorage::open(&config.db_path)?;
        let source = GithubTags::new(config.tags_url.clone(), HTTP_TIMEOUT);
        Ok(Self::with_parts(config, storage, source))
    }
}

impl<S: ReleaseSource> Api<S> {
    pub fn with_parts(config: AppConfig, storage: SqliteStorage, source: S) -> Self {
        let versions = VersionChecker::new(source, build_version(), config.version_cache_ttl);
        Self {
            config,
            storage,
            events: Broadcaster::new(),
            versions,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub const fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    #[must_use]
    pub const fn events(&self) -> &Broadcaster {
        &self.events
    }

    /// Check an `Authorization` header against the configured token.
    ///
    /// # Errors
    ///
    /// See [`authorize`].
    pub fn authorize(&self, header: Option<&str>) -> Result<()> {
        authorize(self.config.api_token.as_deref(), header)
    }

    fn lang(&self) -> &str {
        &self.config.default_lang
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub struct NoRelease;

    impl ReleaseSource for NoRelease {
        async fn latest_tag(&self) -> String {
            crate::release::UNKNOWN_VERSION.to_string()
        }
    }

    pub fn api() -> Api<NoRelease> {
        let storage = SqliteStorage::open_memory().unwrap();
        Api::with_parts(AppConfig::for_path(":memory:"), storage, NoRelease)
    }

    pub fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    pub fn json(response: &ApiResponse) -> &serde_json::Value {
        response.json_body().unwrap()
    }
}
