//! Configuration management.
//!
//! Resolves the database location, the operator API token, and the
//! service settings shared by every handler.
//!
//! # Environment
//!
//! - `KOFFAN_DB` — database path (overridden by `--db`)
//! - `KOFFAN_TEST_DB` — any truthy value redirects to an isolated test database
//! - `API_TOKEN` — bearer token for the gated API; unset disables it
//! - `DEFAULT_LANG` — language for server-side defaults (section names, messages)
//! - `KOFFAN_TAGS_URL` — override for the release tag listing endpoint

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Release tag listing queried by the version checker.
pub const DEFAULT_TAGS_URL: &str = "https://api.github.com/repos/PanSalut/Koffan/tags";

/// Prefix of the release page linked when an update is available.
pub const RELEASE_URL_BASE: &str = "https://github.com/PanSalut/Koffan/releases/tag/";

/// How long a fetched release tag is trusted.
pub const VERSION_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Timeout for the release tag request.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest accepted import upload.
pub const MAX_IMPORT_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Version string of this build.
///
/// Set `KOFFAN_VERSION` at compile time for release builds; local builds report `dev`.
#[must_use]
pub fn build_version() -> &'static str {
    option_env!("KOFFAN_VERSION").unwrap_or("dev")
}

/// Settings shared by the service and its handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
    /// Operator token for the gated API. `None` disables the gated handlers.
    pub api_token: Option<String>,
    /// Language for localized defaults.
    pub default_lang: String,
    /// Endpoint listing release tags, newest first.
    pub tags_url: String,
    /// Lifetime of a cached release tag.
    pub version_cache_ttl: Duration,
    /// Upper bound for import uploads, in bytes.
    pub max_import_bytes: usize,
}

impl AppConfig {
    /// Configuration with defaults for the given database path.
    #[must_use]
    pub fn for_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            api_token: None,
            default_lang: crate::i18n::FALLBACK_LANG.to_string(),
            tags_url: DEFAULT_TAGS_URL.to_string(),
            version_cache_ttl: VERSION_CACHE_TTL,
            max_import_bytes: MAX_IMPORT_FILE_SIZE,
        }
    }

    /// Resolve configuration from an optional explicit database path and the environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no database location can be determined.
    pub fn from_env(explicit_db: Option<&Path>) -> Result<Self> {
        let db_path = resolve_db_path(explicit_db)
            .ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?;

        let mut config = Self::for_path(db_path);
        config.api_token = api_token_from_env();

        if let Ok(lang) = std::env::var("DEFAULT_LANG") {
            if !lang.trim().is_empty() {
                config.default_lang = lang.trim().to_string();
            }
        }

        if let Ok(url) = std::env::var("KOFFAN_TAGS_URL") {
            if !url.trim().is_empty() {
                config.tags_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Attach an operator token (empty strings disable the gate).
    #[must_use]
    pub fn with_api_token(mut self, token: Option<&str>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty()).map(ToString::to_string);
        self
    }
}

/// Read the operator token from `API_TOKEN`.
#[must_use]
pub fn api_token_from_env() -> Option<String> {
    std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Get the global Koffan directory (`~/.koffan/`).
#[must_use]
pub fn global_koffan_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".koffan"))
}

/// Check if test mode is enabled via `KOFFAN_TEST_DB`.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("KOFFAN_TEST_DB").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && value.to_lowercase() != "false"
}

/// Get the test database path (`~/.koffan/test/koffan.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_koffan_dir().map(|dir| dir.join("test").join("koffan.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. `explicit_path` (from `--db`)
/// 2. `KOFFAN_TEST_DB` → isolated test database
/// 3. `KOFFAN_DB` environment variable
/// 4. `~/.koffan/data/koffan.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    if let Ok(db_path) = std::env::var("KOFFAN_DB") {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_koffan_dir().map(|dir| dir.join("data").join("koffan.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/koffan.db");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_resolve_db_path_default_name() {
        let path = resolve_db_path(None).unwrap();
        assert!(path.ends_with("koffan.db"));
    }

    #[test]
    fn test_test_db_path_is_separate() {
        let global = global_koffan_dir().unwrap();
        let test = test_db_path().unwrap();
        assert!(test.to_string_lossy().contains("test"));
        assert_ne!(global.join("data").join("koffan.db"), test);
    }

    #[test]
    fn test_truthy_parsing() {
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("FALSE"));
        assert!(!is_truthy(""));
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
    }

    #[test]
    fn test_empty_token_disables_gate() {
        let config = AppConfig::for_path("/tmp/k.db").with_api_token(Some(""));
        assert!(config.api_token.is_none());
        let config = config.with_api_token(Some("s3cret"));
        assert_eq!(config.api_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::for_path("/tmp/k.db");
        assert_eq!(config.version_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.max_import_bytes, 5 * 1024 * 1024);
        assert_eq!(config.default_lang, "en");
    }
}
