//! Bearer-token gate.

use crate::error::{Error, Result};

/// `Authorization` header value carrying `token`.
#[must_use]
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Check an `Authorization` header against the operator token.
///
/// Checks run in order: a token must be configured, a header must be
/// present, the scheme must be `Bearer` (any case), and the token must match.
///
/// # Errors
///
/// Returns `ApiDisabled`, `MissingToken`, `InvalidAuthFormat`, or `InvalidToken`.
pub fn authorize(expected: Option<&str>, header: Option<&str>) -> Result<()> {
    let expected = expected.filter(|t| !t.is_empty()).ok_or(Error::ApiDisabled)?;
    let header = header.filter(|h| !h.is_empty()).ok_or(Error::MissingToken)?;

    let (scheme, token) = header.split_once(' ').ok_or(Error::InvalidAuthFormat)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::InvalidAuthFormat);
    }
    if token != expected {
        return Err(Error::InvalidToken);
    }
    Ok(())
}
