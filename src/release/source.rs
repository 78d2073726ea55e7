//! Where release tags come from.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::UNKNOWN_VERSION;

/// A source of the newest published release tag.
///
/// Implementations never fail; any problem is reported as
/// [`UNKNOWN_VERSION`](super::UNKNOWN_VERSION).
pub trait ReleaseSource: Send + Sync {
    /// Newest tag name, e.g. `v1.4.2`.
    fn latest_tag(&self) -> impl Future<Output = String> + Send;
}

/// Tag listing from the GitHub REST API, newest first.
pub struct GithubTags {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    name: String,
}

impl GithubTags {
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    async fn fetch(&self) -> Result<Option<String>, reqwest::Error> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, concat!("koffan/", env!("CARGO_PKG_VERSION")))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?;

        let tags: Vec<TagResponse> = response.json().await?;
        Ok(tags.into_iter().next().map(|t| t.name))
    }
}

impl ReleaseSource for GithubTags {
    async fn latest_tag(&self) -> String {
        match self.fetch().await {
            Ok(Some(tag)) => {
                debug!(tag = %tag, "Fetched latest release tag");
                tag
            }
            Ok(None) => {
                warn!(url = %self.url, "Release tag listing is empty");
                UNKNOWN_VERSION.to_string()
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Failed to fetch release tags");
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unknown() {
        let source = GithubTags::new("http://127.0.0.1:1/tags", Duration::from_millis(500));
        assert_eq!(source.latest_tag().await, UNKNOWN_VERSION);
    }
}
