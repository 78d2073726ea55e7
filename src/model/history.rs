//! Item history model.
//!
//! History drives autocomplete: every item name ever added is remembered
//! with the section it was last placed in and how often it was used.

use serde::{Deserialize, Serialize};

/// A remembered item name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,

    /// Item name, unique case-insensitively
    pub name: String,

    /// Section the item was last added to; cleared when that section is deleted
    pub last_section_id: Option<i64>,

    /// Name of `last_section_id`, when it still exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_section_name: Option<String>,

    /// Number of times the name was used (at least 1)
    pub usage_count: i64,

    /// Last use timestamp (Unix milliseconds)
    pub last_used_at: i64,
}
