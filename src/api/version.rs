//! Version handler.

use super::{Api, ApiResponse};
use crate::error::Result;
use crate::release::ReleaseSource;

impl<S: ReleaseSource> Api<S> {
    /// `{current, latest, update_available, release_url?}`.
    ///
    /// The latest tag is cached; lookup failures report `unknown`.
    pub async fn version(&self) -> Result<ApiResponse> {
        let info = self.versions.check().await;
        ApiResponse::ok(info)
    }
}
