//! Field limits and input validation.
//!
//! Handlers reject over-long input with a validation error; the importer
//! truncates to the same limits instead. Lengths are counted in characters.

use crate::error::{Error, Result};

pub const MAX_LIST_NAME_LENGTH: usize = 100;
pub const MAX_SECTION_NAME_LENGTH: usize = 100;
pub const MAX_ITEM_NAME_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_ICON_LENGTH: usize = 10;
pub const MAX_TEMPLATE_NAME_LENGTH: usize = 100;

/// List name used as the marker for history rows in CSV files.
pub const RESERVED_LIST_NAME: &str = "[HISTORY]";

/// Icon given to lists created without one.
pub const DEFAULT_LIST_ICON: &str = "🛒";

/// Whether `value` is longer than `max` characters.
#[must_use]
pub fn exceeds(value: &str, max: usize) -> bool {
    value.chars().nth(max).is_some()
}

/// Cut `value` down to at most `max` characters.
#[must_use]
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

/// Require a non-empty name no longer than `max` characters.
///
/// # Errors
///
/// Returns `Error::Validation` naming the violated rule.
pub fn require_name(value: &str, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation("Name is required".to_string()));
    }
    check_length("Name", value, max)
}

/// Reject `value` if it is longer than `max` characters.
///
/// # Errors
///
/// Returns `Error::Validation` with the field's maximum length.
pub fn check_length(field: &str, value: &str, max: usize) -> Result<()> {
    if exceeds(value, max) {
        return Err(Error::Validation(format!(
            "{field} exceeds maximum length of {max} characters"
        )));
    }
    Ok(())
}

/// Validate a list name: required, length-limited, not the reserved marker.
///
/// # Errors
///
/// Returns `Error::Validation`; the reserved-name message is localized.
pub fn validate_list_name(name: &str, lang: &str) -> Result<()> {
    require_name(name, MAX_LIST_NAME_LENGTH)?;
    if name == RESERVED_LIST_NAME {
        return Err(Error::Validation(crate::i18n::get(lang, "common.reserved_name")));
    }
    Ok(())
}

/// Icon to store for a list: blank or over-long icons fall back to the default.
#[must_use]
pub fn normalize_icon(icon: &str) -> String {
    if icon.is_empty() || exceeds(icon, MAX_ICON_LENGTH) {
        DEFAULT_LIST_ICON.to_string()
    } else {
        icon.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        let name = "ż".repeat(250);
        let cut = truncate_chars(&name, MAX_ITEM_NAME_LENGTH);
        assert_eq!(cut.chars().count(), 200);
        assert_eq!(truncate_chars("milk", 200), "milk");
    }

    #[test]
    fn test_exceeds_boundary() {
        let exact = "a".repeat(100);
        assert!(!exceeds(&exact, 100));
        assert!(exceeds(&format!("{exact}b"), 100));
    }

    #[test]
    fn test_require_name() {
        assert!(require_name("", 10).is_err());
        assert!(require_name("Bread", 10).is_ok());
        let err = require_name(&"x".repeat(201), MAX_ITEM_NAME_LENGTH).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Name exceeds maximum length of 200 characters"
        );
    }

    #[test]
    fn test_reserved_list_name_rejected() {
        assert!(validate_list_name(RESERVED_LIST_NAME, "en").is_err());
        assert!(validate_list_name("[history]", "en").is_ok());
    }

    #[test]
    fn test_normalize_icon() {
        assert_eq!(normalize_icon(""), DEFAULT_LIST_ICON);
        assert_eq!(normalize_icon("🥦"), "🥦");
        assert_eq!(normalize_icon("not-an-icon-at-all"), DEFAULT_LIST_ICON);
    }
}
