//! Shopping list model.
//!
//! A list owns an ordered collection of sections, each owning an ordered
//! collection of items. Deleting a list cascades to its sections and items.

use serde::{Deserialize, Serialize};

/// A shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: i64,

    /// Display name (at most 100 characters, never `[HISTORY]`)
    pub name: String,

    /// Emoji or short icon string
    pub icon: String,

    /// Position among all lists
    pub sort_order: i64,

    /// Whether this is the list shown by default
    pub is_active: bool,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,

    /// Item counts, filled in by list queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ListStats>,
}

/// Completion counters for a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStats {
    pub total_items: i64,
    pub completed_items: i64,
}

impl ListStats {
    /// Percentage of completed items, rounded down.
    #[must_use]
    pub fn percent_complete(&self) -> i64 {
        if self.total_items == 0 {
            0
        } else {
            self.completed_items * 100 / self.total_items
        }
    }
}

/// A named group of items inside a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub list_id: i64,

    /// Section name (at most 100 characters)
    pub name: String,

    /// Position within the owning list, unique per list
    pub sort_order: i64,

    pub created_at: i64,

    /// Items in sort order; empty when loaded without items
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A single entry on a shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub section_id: i64,

    /// Item name (at most 200 characters)
    pub name: String,

    /// Free-text note (at most 500 characters)
    pub description: String,

    pub completed: bool,

    /// Marked as "maybe buy"
    pub uncertain: bool,

    /// Position within the owning section, unique per section
    pub sort_order: i64,

    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_complete() {
        let stats = ListStats { total_items: 3, completed_items: 1 };
        assert_eq!(stats.percent_complete(), 33);
        assert_eq!(ListStats::default().percent_complete(), 0);
    }

    #[test]
    fn test_stats_omitted_when_absent() {
        let list = List {
            id: 1,
            name: "Groceries".into(),
            icon: "🛒".into(),
            sort_order: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
            stats: None,
        };
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.get("stats").is_none());
        assert_eq!(json["is_active"], true);
    }
}
