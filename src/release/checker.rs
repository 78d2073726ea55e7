//! Cached update check.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;

use super::{ReleaseSource, is_newer_version};
use crate::config::RELEASE_URL_BASE;

/// Result of an update check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub current: String,
    pub latest: String,
    pub update_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_url: Option<String>,
}

/// Latest-release lookup with a single time-limited cache slot.
///
/// A failed lookup is cached like a successful one, so an unreachable source
/// is queried at most once per TTL.
pub struct VersionChecker<S> {
    source: S,
    current: String,
    ttl: Duration,
    cache: RwLock<Option<(String, Instant)>>,
}

impl<S: ReleaseSource> VersionChecker<S> {
    pub fn new(source: S, current: impl Into<String>, ttl: Duration) -> Self {
        Self {
            source,
            current: current.into(),
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Version of the running build.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Cached tag if it is still fresh.
    fn cached(&self) -> Option<String> {
        let slot = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.ttl)
            .map(|(tag, _)| tag.clone())
    }

    /// Latest release tag, refreshed when the cache has expired.
    pub async fn latest(&self) -> String {
        if let Some(tag) = self.cached() {
            return tag;
        }

        let tag = self.source.latest_tag().await;
        let mut slot = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some((tag.clone(), Instant::now()));
        tag
    }

    /// Compare the running build against the latest release.
    pub async fn check(&self) -> VersionInfo {
        let latest = self.latest().await;
        let update_available = is_newer_version(&latest, &self.current);
        let release_url = update_available.then(|| format!("{RELEASE_URL_BASE}{latest}"));

        VersionInfo {
            current: self.current.clone(),
            latest,
            update_available,
            release_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::UNKNOWN_VERSION;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        tag: &'static str,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(tag: &'static str) -> Self {
            Self {
                tag,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ReleaseSource for FakeSource {
        async fn latest_tag(&self) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tag.to_string()
        }
    }

    #[tokio::test]
    async fn test_update_available() {
        let checker = VersionChecker::new(FakeSource::new("v1.2.0"), "1.1.9", Duration::from_secs(3600));
        let info = checker.check().await;
        assert!(info.update_available);
        assert_eq!(
            info.release_url.as_deref(),
            Some("https://github.com/PanSalut/Koffan/releases/tag/v1.2.0")
        );
    }

    #[tokio::test]
    async fn test_no_update_omits_url() {
        let checker = VersionChecker::new(FakeSource::new("1.1.9"), "v1.2.0", Duration::from_secs(3600));
        let info = checker.check().await;
        assert!(!info.update_available);
        assert!(info.release_url.is_none());

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("release_url").is_none());
        assert_eq!(json["current"], "v1.2.0");
    }

    #[tokio::test]
    async fn test_cache_within_ttl() {
        let checker = VersionChecker::new(FakeSource::new("v2.0.0"), "1.0.0", Duration::from_secs(3600));
        checker.check().await;
        checker.check().await;
        checker.latest().await;
        assert_eq!(checker.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let checker = VersionChecker::new(FakeSource::new("v2.0.0"), "1.0.0", Duration::ZERO);
        checker.latest().await;
        checker.latest().await;
        assert_eq!(checker.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_is_cached_and_never_an_update() {
        let checker =
            VersionChecker::new(FakeSource::new(UNKNOWN_VERSION), "1.0.0", Duration::from_secs(3600));
        let info = checker.check().await;
        assert_eq!(info.latest, "unknown");
        assert!(!info.update_available);
        checker.check().await;
        assert_eq!(checker.source.calls.load(Ordering::SeqCst), 1);
    }
}
