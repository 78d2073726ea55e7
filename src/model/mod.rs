//! Data models for Koffan.
//!
//! This module contains all domain models:
//! - List, Section, Item
//! - HistoryEntry
//! - Template, TemplateItem

pub mod history;
pub mod list;
pub mod template;

pub use history::HistoryEntry;
pub use list::{Item, List, ListStats, Section};
pub use template::{Template, TemplateItem};
