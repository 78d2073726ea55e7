//! Types for import and export.
//!
//! This module defines the JSON envelope exchanged with other Koffan
//! instances, the options and statistics of a transfer, and the error type.

use serde::{Deserialize, Serialize};

/// Envelope version written by this build.
pub const EXPORT_VERSION: &str = "1.0";

/// Value of the envelope's `app` field.
pub const APP_NAME: &str = "koffan";

/// Fixed CSV header row.
pub const CSV_HEADER: [&str; 7] = [
    "list_name",
    "list_icon",
    "section_name",
    "item_name",
    "item_description",
    "item_completed",
    "item_uncertain",
];

/// UTF-8 byte-order mark prefixed to CSV exports.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Most history entries written to an export.
pub const HISTORY_EXPORT_LIMIT: usize = 1000;

/// Most history entries counted by the export preview.
pub const HISTORY_PREVIEW_LIMIT: usize = 100;

// ── Envelope ──────────────────────────────────────────────────

/// Versioned export document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub exported_at: String,
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub data: DataBody,
}

/// Payload of an export document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataBody {
    #[serde(default)]
    pub lists: Vec<ListRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryRecord>,
}

/// A list with its sections and items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRecord {
    pub name: String,
    pub icon: String,
    pub is_active: bool,
    pub sections: Vec<SectionRecord>,
}

impl ListRecord {
    /// Number of items across all sections.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionRecord {
    pub name: String,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRecord {
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub uncertain: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateRecord {
    pub name: String,
    pub description: String,
    pub items: Vec<TemplateItemRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateItemRecord {
    pub section_name: String,
    pub name: String,
    pub description: String,
}

/// History entry keyed by name; the section is referenced by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryRecord {
    pub name: String,
    pub last_section: String,
    pub usage_count: i64,
}

// ── Options ───────────────────────────────────────────────────

/// File format of an upload or export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Csv,
}

impl Format {
    /// Parse a `format` parameter. Anything but `csv` means JSON.
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        if value.eq_ignore_ascii_case("csv") {
            Self::Csv
        } else {
            Self::Json
        }
    }

    /// Detect the format of an upload from its filename, then its content.
    #[must_use]
    pub fn detect(filename: &str, data: &[u8]) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".json") {
            return Self::Json;
        }
        if lower.ends_with(".csv") {
            return Self::Csv;
        }
        match data.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{' | b'[') => Self::Json,
            _ => Self::Csv,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// How an imported list whose name already exists is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Drop the imported list.
    #[default]
    Skip,
    /// Delete the existing list, then import under the same name.
    Replace,
    /// Import under a new name with the copy suffix.
    Copy,
}

impl ConflictResolution {
    /// Parse a resolution value. Unknown values silently become `Skip`.
    #[must_use]
    pub fn sanitize(value: &str) -> Self {
        match value {
            "replace" => Self::Replace,
            "copy" => Self::Copy,
            _ => Self::Skip,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Replace => "replace",
            Self::Copy => "copy",
        }
    }
}

/// First byte of `value` as a CSV delimiter, `,` when empty.
#[must_use]
pub fn parse_delimiter(value: &str) -> u8 {
    value.as_bytes().first().copied().unwrap_or(b',')
}

/// Settings for one import.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub resolution: ConflictResolution,
    pub copy_suffix: String,
    pub delimiter: u8,
    /// Language for the default section name and messages.
    pub lang: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            resolution: ConflictResolution::Skip,
            copy_suffix: "copy".to_string(),
            delimiter: b',',
            lang: crate::i18n::FALLBACK_LANG.to_string(),
        }
    }
}

/// Settings for one export.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub format: Format,
    pub include_templates: bool,
    pub include_history: bool,
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: Format::Json,
            include_templates: true,
            include_history: true,
            delimiter: b',',
        }
    }
}

// ── Results ───────────────────────────────────────────────────

/// Counts reported after an import.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    pub imported_lists: usize,
    pub imported_items: usize,
    pub imported_templates: usize,
    pub imported_history: usize,
    pub skipped_lists: usize,
    /// Items dropped for having no name.
    pub skipped_items: usize,
}

/// Summary of an upload, computed without importing it.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportPreview {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub format: String,
    pub lists_count: usize,
    pub items_count: usize,
    pub templates_count: usize,
    pub history_count: usize,
    pub lists: Vec<ImportListInfo>,
    pub conflicting_lists: Vec<String>,
}

impl ImportPreview {
    /// A rejected upload.
    #[must_use]
    pub fn invalid(format: Format, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
            format: format.as_str().to_string(),
            ..Self::default()
        }
    }
}

/// One list of an upload as shown by the preview.
#[derive(Debug, Clone, Serialize)]
pub struct ImportListInfo {
    pub name: String,
    pub icon: String,
    pub sections: usize,
    pub items: usize,
    pub has_conflict: bool,
}

/// Counts of what an export would contain.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ExportPreview {
    pub lists_count: usize,
    pub items_count: usize,
    pub templates_count: usize,
    pub history_count: usize,
}

/// A rendered export.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

// ── Errors ────────────────────────────────────────────────────

/// Transfer-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Rejected input, shown to the caller as-is.
    #[error("{0}")]
    Invalid(String),

    #[error("File too large (max {}MB)", .max / (1024 * 1024))]
    TooLarge { max: usize },

    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),
}

impl TransferError {
    /// Whether the error is the caller's fault (bad upload) rather than ours.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Invalid(_) | Self::TooLarge { .. } | Self::Csv(_) | Self::Json(_)
        )
    }
}

impl From<rusqlite::Error> for TransferError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<crate::error::Error> for TransferError {
    fn from(err: crate::error::Error) -> Self {
        match err {
            crate::error::Error::Transfer(inner) => inner,
            other => Self::Database(other.to_string()),
        }
    }
}

/// Result type for transfer operations.
pub type TransferResult<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_sanitize() {
        assert_eq!(ConflictResolution::sanitize("copy"), ConflictResolution::Copy);
        assert_eq!(ConflictResolution::sanitize("replace"), ConflictResolution::Replace);
        assert_eq!(ConflictResolution::sanitize("merge"), ConflictResolution::Skip);
        assert_eq!(ConflictResolution::sanitize("COPY"), ConflictResolution::Skip);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::detect("backup.JSON", b"a,b"), Format::Json);
        assert_eq!(Format::detect("backup.csv", b"{}"), Format::Csv);
        assert_eq!(Format::detect("upload", b"  \n{\"app\":\"koffan\"}"), Format::Json);
        assert_eq!(Format::detect("upload", b"[]"), Format::Json);
        assert_eq!(Format::detect("upload", b"list_name,list_icon"), Format::Csv);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(""), b',');
        assert_eq!(parse_delimiter(";"), b';');
        assert_eq!(parse_delimiter("\tx"), b'\t');
    }

    #[test]
    fn test_too_large_message() {
        let err = TransferError::TooLarge { max: crate::config::MAX_IMPORT_FILE_SIZE };
        assert_eq!(err.to_string(), "File too large (max 5MB)");
        assert!(err.is_input_error());
        assert!(!TransferError::Database("locked".into()).is_input_error());
    }

    #[test]
    fn test_envelope_decodes_sparse_document() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"data":{"lists":[{"name":"Groceries"}]}}"#).unwrap();
        assert_eq!(envelope.app, "");
        assert_eq!(envelope.data.lists[0].name, "Groceries");
        assert!(envelope.data.lists[0].sections.is_empty());
        assert!(envelope.data.history.is_empty());
    }

    #[test]
    fn test_empty_templates_omitted() {
        let json = serde_json::to_value(DataBody::default()).unwrap();
        assert!(json.get("templates").is_none());
        assert!(json["lists"].as_array().unwrap().is_empty());
    }
}
