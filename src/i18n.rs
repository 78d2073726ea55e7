//! Localized strings used by the backend.
//!
//! Only the handful of strings the server itself produces live here; the
//! web client carries its own translations. Unknown keys come back unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Language used when none is configured or the configured one is unknown.
pub const FALLBACK_LANG: &str = "en";

static STRINGS: LazyLock<HashMap<(&str, &str), &str>> = LazyLock::new(|| {
    [
        (("en", "sections.default"), "General"),
        (("pl", "sections.default"), "Ogólne"),
        (("de", "sections.default"), "Allgemein"),
        (("es", "sections.default"), "General"),
        (("fr", "sections.default"), "Général"),
        (("it", "sections.default"), "Generale"),
        (("uk", "sections.default"), "Загальне"),
        (("en", "common.reserved_name"), "This name is reserved"),
        (("pl", "common.reserved_name"), "Ta nazwa jest zarezerwowana"),
        (("de", "common.reserved_name"), "Dieser Name ist reserviert"),
        (("es", "common.reserved_name"), "Este nombre está reservado"),
        (("fr", "common.reserved_name"), "Ce nom est réservé"),
        (("it", "common.reserved_name"), "Questo nome è riservato"),
        (("uk", "common.reserved_name"), "Ця назва зарезервована"),
    ]
    .into_iter()
    .collect()
});

/// Look up `key` for `lang`, falling back to English, then to the key itself.
#[must_use]
pub fn get(lang: &str, key: &str) -> String {
    let lang = lang.to_lowercase();
    STRINGS
        .get(&(lang.as_str(), key))
        .or_else(|| STRINGS.get(&(FALLBACK_LANG, key)))
        .map_or_else(|| key.to_string(), |s| (*s).to_string())
}

/// Name given to sections created without one during CSV import.
#[must_use]
pub fn default_section_name(lang: &str) -> String {
    let name = get(lang, "sections.default");
    if name == "sections.default" {
        "General".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_section_name() {
        assert_eq!(default_section_name("en"), "General");
        assert_eq!(default_section_name("PL"), "Ogólne");
        assert_eq!(default_section_name("xx"), "General");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        assert_eq!(get("en", "no.such.key"), "no.such.key");
    }
}
