//! Clear command implementation.

use super::{Context, request};
use crate::error::Result;

/// Delete every list, template, and history entry.
///
/// # Errors
///
/// Returns `Error::InvalidConfirmation` unless `confirmation` is exactly `DELETE`.
pub fn execute(confirmation: &str, ctx: &Context<'_>) -> Result<()> {
    let mut api = ctx.open()?;
    let body = request(&serde_json::json!({ "confirmation": confirmation }))?;
    let response = api.clear_database(&body)?;
    ctx.emit(&response, |_: serde_json::Value| println!("Database cleared"))
}
