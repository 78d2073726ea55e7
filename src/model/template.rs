//! Template models.
//!
//! Templates are reusable bundles of items that can be applied to any list.
//! They reference sections by name, not by id, so they survive list deletion.

use serde::{Deserialize, Serialize};

/// A named, reusable set of items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    #[serde(default)]
    pub items: Vec<TemplateItem>,
}

/// One (section name, item name, description) triple of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateItem {
    pub id: i64,
    pub template_id: i64,
    pub section_name: String,
    pub name: String,
    pub description: String,
    pub sort_order: i64,
}
