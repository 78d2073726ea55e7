//! Release tracking.
//!
//! The latest published tag is fetched from a [`ReleaseSource`] and cached by
//! a [`VersionChecker`] for an hour. Failures degrade to [`UNKNOWN_VERSION`],
//! which never counts as an update.

mod checker;
mod source;

pub use checker::{VersionChecker, VersionInfo};
pub use source::{GithubTags, ReleaseSource};

/// Placeholder for a version that could not be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Version reported by local builds.
pub const DEV_VERSION: &str = "dev";

/// Parse `major.minor.patch`, ignoring a leading `v`.
///
/// Each component stops at its first non-digit; missing or empty components
/// are zero.
#[must_use]
pub fn parse_version(version: &str) -> [u64; 3] {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);

    let mut parts = [0u64; 3];
    for (slot, component) in parts.iter_mut().zip(version.split('.')) {
        let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
        *slot = digits.parse().unwrap_or(0);
    }
    parts
}

/// Whether `latest` is a newer release than `current`.
///
/// Always false when either side is empty, `unknown`, or `dev`.
#[must_use]
pub fn is_newer_version(latest: &str, current: &str) -> bool {
    let comparable =
        |v: &str| !v.trim().is_empty() && v != UNKNOWN_VERSION && v != DEV_VERSION;
    if !comparable(latest) || !comparable(current) {
        return false;
    }
    parse_version(latest) > parse_version(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v1.2.3"), [1, 2, 3]);
        assert_eq!(parse_version("2.0"), [2, 0, 0]);
        assert_eq!(parse_version("1.4.0-beta.2"), [1, 4, 0]);
        assert_eq!(parse_version("1.10rc1.7"), [1, 10, 7]);
        assert_eq!(parse_version("garbage"), [0, 0, 0]);
    }

    #[test]
    fn test_is_newer_version() {
        assert!(is_newer_version("v1.2.0", "1.1.9"));
        assert!(!is_newer_version("1.1.9", "v1.2.0"));
        assert!(!is_newer_version("v1.2.0", "1.2.0"));
        assert!(is_newer_version("2.0.0", "1.99.99"));
        assert!(is_newer_version("1.0.10", "1.0.9"));
    }

    #[test]
    fn test_placeholders_never_update() {
        assert!(!is_newer_version("unknown", "1.0.0"));
        assert!(!is_newer_version("9.9.9", "dev"));
        assert!(!is_newer_version("", "1.0.0"));
        assert!(!is_newer_version("1.0.0", ""));
    }
}
