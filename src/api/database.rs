//! Whole-database handlers.

use serde::Deserialize;
use tracing::warn;

use super::{Api, ApiResponse, parse_body};
use crate::broadcast::EventKind;
use crate::error::{Error, Result};
use crate::release::ReleaseSource;

/// Word that must be typed to clear the database.
pub const CLEAR_CONFIRMATION: &str = "DELETE";

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub confirmation: String,
}

impl<S: ReleaseSource> Api<S> {
    /// Delete all data. The body must confirm with the literal `DELETE`.
    pub fn clear_database(&mut self, body: &[u8]) -> Result<ApiResponse> {
        let req: ClearRequest = parse_body(body)?;
        if req.confirmation != CLEAR_CONFIRMATION {
            return Err(Error::InvalidConfirmation);
        }

        self.storage.clear_all_data()?;
        warn!("Database cleared");
        self.events.notify(EventKind::DatabaseCleared);
        ApiResponse::ok(serde_json::json!({ "success": true }))
    }
}
