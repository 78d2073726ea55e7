//! Live-update fan-out.
//!
//! Delivery is best-effort: an event published with no subscribers is
//! dropped, and a subscriber that falls more than [`CHANNEL_CAPACITY`]
//! events behind loses the oldest ones.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Events buffered per subscriber.
pub const CHANNEL_CAPACITY: usize = 64;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ListCreated,
    ListUpdated,
    ListDeleted,
    ListActivated,
    ListsReordered,
    SectionCreated,
    SectionUpdated,
    SectionDeleted,
    SectionsReordered,
    ItemCreated,
    ItemUpdated,
    ItemDeleted,
    ItemToggled,
    ItemMoved,
    ItemsReordered,
    HistoryUpdated,
    TemplateCreated,
    TemplateUpdated,
    TemplateDeleted,
    TemplateApplied,
    DataImported,
    DatabaseCleared,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ListCreated => "list_created",
            Self::ListUpdated => "list_updated",
            Self::ListDeleted => "list_deleted",
            Self::ListActivated => "list_activated",
            Self::ListsReordered => "lists_reordered",
            Self::SectionCreated => "section_created",
            Self::SectionUpdated => "section_updated",
            Self::SectionDeleted => "section_deleted",
            Self::SectionsReordered => "sections_reordered",
            Self::ItemCreated => "item_created",
            Self::ItemUpdated => "item_updated",
            Self::ItemDeleted => "item_deleted",
            Self::ItemToggled => "item_toggled",
            Self::ItemMoved => "item_moved",
            Self::ItemsReordered => "items_reordered",
            Self::HistoryUpdated => "history_updated",
            Self::TemplateCreated => "template_created",
            Self::TemplateUpdated => "template_updated",
            Self::TemplateDeleted => "template_deleted",
            Self::TemplateApplied => "template_applied",
            Self::DataImported => "data_imported",
            Self::DatabaseCleared => "database_cleared",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change notification. `data` is `null` when there is nothing to attach.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: serde_json::Value,
}

/// Cloneable handle for publishing and subscribing.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<Event>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event to current subscribers.
    pub fn publish(&self, kind: EventKind, data: impl Serialize) {
        let data = serde_json::to_value(data).unwrap_or(serde_json::Value::Null);
        let delivered = self.sender.send(Event { kind, data }).unwrap_or(0);
        trace!(event = %kind, delivered, "Published event");
    }

    /// Publish an event with no payload.
    pub fn notify(&self, kind: EventKind) {
        self.publish(kind, serde_json::Value::Null);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
