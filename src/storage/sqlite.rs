//! SQLite storage implementation.
//!
//! This module provides the main storage backend for Koffan using SQLite.
//! Every write goes through [`SqliteStorage::mutate`], which wraps the work in
//! an IMMEDIATE transaction. The free functions in the "Transaction helpers"
//! section operate on a borrowed connection so the importer can compose many
//! inserts into one transaction.

use crate::error::{Error, Result};
use crate::model::{HistoryEntry, Item, List, ListStats, Section, Template, TemplateItem};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Direction for sibling reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Row counts across the whole database.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct DataCounts {
    pub lists: usize,
    pub items: usize,
    pub templates: usize,
    pub history: usize,
}

const LIST_COLUMNS: &str = "l.id, l.name, l.icon, l.sort_order, l.is_active, l.created_at, l.updated_at,
     (SELECT COUNT(*) FROM items i JOIN sections s ON i.section_id = s.id WHERE s.list_id = l.id),
     (SELECT COUNT(*) FROM items i JOIN sections s ON i.section_id = s.id
       WHERE s.list_id = l.id AND i.completed = 1)";

const SECTION_COLUMNS: &str = "id, list_id, name, sort_order, created_at";

const ITEM_COLUMNS: &str =
    "id, section_id, name, description, completed, uncertain, sort_order, created_at, updated_at";

const HISTORY_COLUMNS: &str = "h.id, h.name, h.last_section_id, s.name, h.usage_count, h.last_used_at";

const TEMPLATE_ITEM_COLUMNS: &str = "id, template_id, section_name, name, description, sort_order";

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        super::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation inside an IMMEDIATE transaction.
    ///
    /// The closure's error rolls the transaction back; otherwise it is committed.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an error if begin/commit fails.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let result = f(&tx)?;
        tx.commit()?;

        debug!(op, "mutation committed");
        Ok(result)
    }

    // ==================
    // List Operations
    // ==================

    /// All lists in display order, with item counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_lists(&self) -> Result<Vec<List>> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM lists l ORDER BY l.sort_order, l.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_list_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Get a list by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_list(&self, id: i64) -> Result<Option<List>> {
        get_list_tx(&self.conn, id)
    }

    /// Create a list at the end of the display order.
    ///
    /// The first list ever created becomes the active one.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_list(&mut self, name: &str, icon: &str) -> Result<List> {
        self.mutate("create_list", |tx| {
            let has_active: bool = tx
                .prepare("SELECT 1 FROM lists WHERE is_active = 1")?
                .exists([])?;
            let id = insert_list(tx, name, icon, !has_active)?;
            get_list_tx(tx, id)?.ok_or(Error::ListNotFound { id })
        })
    }

    /// Rename a list and change its icon.
    ///
    /// # Errors
    ///
    /// Returns `Error::ListNotFound` if the list doesn't exist.
    pub fn update_list(&mut self, id: i64, name: &str, icon: &str) -> Result<List> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("update_list", |tx| {
            let changed = tx.execute(
                "UPDATE lists SET name = ?1, icon = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![name, icon, now, id],
            )?;
            if changed == 0 {
                return Err(Error::ListNotFound { id });
            }
            get_list_tx(tx, id)?.ok_or(Error::ListNotFound { id })
        })
    }

    /// Delete a list with its sections and items.
    ///
    /// If the deleted list was active, the first remaining list becomes active.
    ///
    /// # Errors
    ///
    /// Returns `Error::ListNotFound` if the list doesn't exist.
    pub fn delete_list(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_list", |tx| {
            if delete_list_tx(tx, id)? == 0 {
                return Err(Error::ListNotFound { id });
            }
            tx.execute(
                "UPDATE lists SET is_active = 1
                 WHERE id = (SELECT id FROM lists ORDER BY sort_order, id LIMIT 1)
                   AND NOT EXISTS (SELECT 1 FROM lists WHERE is_active = 1)",
                [],
            )?;
            Ok(())
        })
    }

    /// Make `id` the only active list.
    ///
    /// # Errors
    ///
    /// Returns `Error::ListNotFound` if the list doesn't exist.
    pub fn set_active_list(&mut self, id: i64) -> Result<List> {
        self.mutate("set_active_list", |tx| {
            if get_list_tx(tx, id)?.is_none() {
                return Err(Error::ListNotFound { id });
            }
            tx.execute(
                "UPDATE lists SET is_active = (id = ?1)",
                rusqlite::params![id],
            )?;
            get_list_tx(tx, id)?.ok_or(Error::ListNotFound { id })
        })
    }

    /// Swap a list with its neighbour. Returns false at the edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::ListNotFound` if the list doesn't exist.
    pub fn move_list(&mut self, id: i64, direction: MoveDirection) -> Result<bool> {
        self.mutate("move_list", |tx| {
            reorder_sibling(tx, Sibling::List, id, direction)?.ok_or(Error::ListNotFound { id })
        })
    }

    /// Sections of a list in order, each with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sections_with_items(&self, list_id: i64) -> Result<Vec<Section>> {
        let mut sections = self.list_sections(list_id)?;
        for section in &mut sections {
            section.items = self.section_items(section.id)?;
        }
        Ok(sections)
    }

    /// Sections of a list in order, without items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sections(&self, list_id: i64) -> Result<Vec<Section>> {
        let sql = format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE list_id = ?1 ORDER BY sort_order, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([list_id], map_section_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    // ==================
    // Section Operations
    // ==================

    /// Get a section by ID (without items).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_section(&self, id: i64) -> Result<Option<Section>> {
        get_section_tx(&self.conn, id)
    }

    /// Create a section at the end of a list.
    ///
    /// # Errors
    ///
    /// Returns `Error::ListNotFound` if the list doesn't exist.
    pub fn create_section(&mut self, list_id: i64, name: &str) -> Result<Section> {
        self.mutate("create_section", |tx| {
            if get_list_tx(tx, list_id)?.is_none() {
                return Err(Error::ListNotFound { id: list_id });
            }
            let id = insert_section(tx, list_id, name)?;
            touch_list(tx, list_id)?;
            get_section_tx(tx, id)?.ok_or(Error::SectionNotFound { id })
        })
    }

    /// Rename a section.
    ///
    /// # Errors
    ///
    /// Returns `Error::SectionNotFound` if the section doesn't exist.
    pub fn update_section(&mut self, id: i64, name: &str) -> Result<Section> {
        self.mutate("update_section", |tx| {
            let changed = tx.execute(
                "UPDATE sections SET name = ?1 WHERE id = ?2",
                rusqlite::params![name, id],
            )?;
            if changed == 0 {
                return Err(Error::SectionNotFound { id });
            }
            get_section_tx(tx, id)?.ok_or(Error::SectionNotFound { id })
        })
    }

    /// Delete a section and its items.
    ///
    /// # Errors
    ///
    /// Returns `Error::SectionNotFound` if the section doesn't exist.
    pub fn delete_section(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_section", |tx| {
            let changed = tx.execute("DELETE FROM sections WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(Error::SectionNotFound { id });
            }
            Ok(())
        })
    }

    /// Items of a section in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn section_items(&self, section_id: i64) -> Result<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE section_id = ?1 ORDER BY sort_order, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([section_id], map_item_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Swap a section with its neighbour in the same list. Returns false at the edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::SectionNotFound` if the section doesn't exist.
    pub fn move_section(&mut self, id: i64, direction: MoveDirection) -> Result<bool> {
        self.mutate("move_section", |tx| {
            reorder_sibling(tx, Sibling::Section, id, direction)?
                .ok_or(Error::SectionNotFound { id })
        })
    }

    // ==================
    // Item Operations
    // ==================

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        get_item_tx(&self.conn, id)
    }

    /// Create an item at the end of a section and remember its name in history.
    ///
    /// # Errors
    ///
    /// Returns `Error::SectionNotFound` if the section doesn't exist.
    pub fn create_item(&mut self, section_id: i64, name: &str, description: &str) -> Result<Item> {
        self.mutate("create_item", |tx| {
            let section =
                get_section_tx(tx, section_id)?.ok_or(Error::SectionNotFound { id: section_id })?;
            let id = insert_item(tx, section_id, name, description, false, false)?;
            save_history_tx(tx, name, Some(section_id))?;
            touch_list(tx, section.list_id)?;
            get_item_tx(tx, id)?.ok_or(Error::ItemNotFound { id })
        })
    }

    /// Change an item's name and description.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemNotFound` if the item doesn't exist.
    pub fn update_item(&mut self, id: i64, name: &str, description: &str) -> Result<Item> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("update_item", |tx| {
            let changed = tx.execute(
                "UPDATE items SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![name, description, now, id],
            )?;
            if changed == 0 {
                return Err(Error::ItemNotFound { id });
            }
            get_item_tx(tx, id)?.ok_or(Error::ItemNotFound { id })
        })
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemNotFound` if the item doesn't exist.
    pub fn delete_item(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_item", |tx| {
            let changed = tx.execute("DELETE FROM items WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(Error::ItemNotFound { id });
            }
            Ok(())
        })
    }

    /// Flip the completed flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemNotFound` if the item doesn't exist.
    pub fn toggle_item_completed(&mut self, id: i64) -> Result<Item> {
        self.toggle_item_flag(id, "completed")
    }

    /// Flip the uncertain flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemNotFound` if the item doesn't exist.
    pub fn toggle_item_uncertain(&mut self, id: i64) -> Result<Item> {
        self.toggle_item_flag(id, "uncertain")
    }

    fn toggle_item_flag(&mut self, id: i64, column: &'static str) -> Result<Item> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("toggle_item", |tx| {
            let sql = format!(
                "UPDATE items SET {column} = CASE {column} WHEN 0 THEN 1 ELSE 0 END, updated_at = ?1
                 WHERE id = ?2"
            );
            if tx.execute(&sql, rusqlite::params![now, id])? == 0 {
                return Err(Error::ItemNotFound { id });
            }
            get_item_tx(tx, id)?.ok_or(Error::ItemNotFound { id })
        })
    }

    /// Move an item to the end of another section.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemNotFound` or `Error::TargetSectionNotFound`.
    pub fn move_item_to_section(&mut self, id: i64, section_id: i64) -> Result<Item> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("move_item_to_section", |tx| {
            if get_item_tx(tx, id)?.is_none() {
                return Err(Error::ItemNotFound { id });
            }
            if get_section_tx(tx, section_id)?.is_none() {
                return Err(Error::TargetSectionNotFound { id: section_id });
            }
            let sort_order = next_sort_order(tx, "items", "section_id", section_id)?;
            tx.execute(
                "UPDATE items SET section_id = ?1, sort_order = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![section_id, sort_order, now, id],
            )?;
            get_item_tx(tx, id)?.ok_or(Error::ItemNotFound { id })
        })
    }

    /// Swap an item with its neighbour in the same section. Returns false at the edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemNotFound` if the item doesn't exist.
    pub fn move_item(&mut self, id: i64, direction: MoveDirection) -> Result<bool> {
        self.mutate("move_item", |tx| {
            reorder_sibling(tx, Sibling::Item, id, direction)?.ok_or(Error::ItemNotFound { id })
        })
    }

    // ==================
    // History Operations
    // ==================

    /// History entries, most used first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM item_history h
             LEFT JOIN sections s ON h.last_section_id = s.id
             ORDER BY h.usage_count DESC, h.last_used_at DESC, h.id
             LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([limit], map_history_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Record one use of `name`, optionally placed in `section_id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::SectionNotFound` if a section is given but doesn't exist.
    pub fn save_history(&mut self, name: &str, section_id: Option<i64>) -> Result<()> {
        self.mutate("save_history", |tx| {
            if let Some(id) = section_id {
                if get_section_tx(tx, id)?.is_none() {
                    return Err(Error::SectionNotFound { id });
                }
            }
            save_history_tx(tx, name, section_id)
        })
    }

    /// Delete one history entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::HistoryNotFound` if the entry doesn't exist.
    pub fn delete_history(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_history", |tx| {
            if tx.execute("DELETE FROM item_history WHERE id = ?1", [id])? == 0 {
                return Err(Error::HistoryNotFound { id });
            }
            Ok(())
        })
    }

    /// Delete several history entries. Returns how many existed.
    ///
    /// # Errors
    ///
    /// Returns an error if a delete fails.
    pub fn delete_history_batch(&mut self, ids: &[i64]) -> Result<usize> {
        self.mutate("delete_history_batch", |tx| {
            let mut stmt = tx.prepare("DELETE FROM item_history WHERE id = ?1")?;
            let mut deleted = 0;
            for id in ids {
                deleted += stmt.execute([id])?;
            }
            Ok(deleted)
        })
    }

    /// Name of a section currently holding an item called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn section_name_for_item(&self, name: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT s.name FROM items i JOIN sections s ON i.section_id = s.id
                 WHERE i.name = ?1 COLLATE NOCASE
                 ORDER BY i.updated_at DESC LIMIT 1",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    // ==================
    // Template Operations
    // ==================

    /// All templates with their items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_templates(&self) -> Result<Vec<Template>> {
        let ids: Vec<i64> = self
            .conn
            .prepare("SELECT id FROM templates ORDER BY name COLLATE NOCASE, id")?
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;

        let mut templates = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(template) = get_template_tx(&self.conn, id)? {
                templates.push(template);
            }
        }
        Ok(templates)
    }

    /// Get a template with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_template(&self, id: i64) -> Result<Option<Template>> {
        get_template_tx(&self.conn, id)
    }

    /// Create an empty template.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_template(&mut self, name: &str, description: &str) -> Result<Template> {
        self.mutate("create_template", |tx| {
            let id = insert_template(tx, name, description)?;
            get_template_tx(tx, id)?.ok_or(Error::TemplateNotFound { id })
        })
    }

    /// Delete a template and its items.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateNotFound` if the template doesn't exist.
    pub fn delete_template(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_template", |tx| {
            if tx.execute("DELETE FROM templates WHERE id = ?1", [id])? == 0 {
                return Err(Error::TemplateNotFound { id });
            }
            Ok(())
        })
    }

    /// Append an item to a template.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateNotFound` if the template doesn't exist.
    pub fn add_template_item(
        &mut self,
        template_id: i64,
        section_name: &str,
        name: &str,
        description: &str,
    ) -> Result<TemplateItem> {
        self.mutate("add_template_item", |tx| {
            if !tx
                .prepare("SELECT 1 FROM templates WHERE id = ?1")?
                .exists([template_id])?
            {
                return Err(Error::TemplateNotFound { id: template_id });
            }
            let sort_order = next_sort_order(tx, "template_items", "template_id", template_id)?;
            let id =
                insert_template_item(tx, template_id, section_name, name, description, sort_order)?;
            let sql = format!("SELECT {TEMPLATE_ITEM_COLUMNS} FROM template_items WHERE id = ?1");
            tx.query_row(&sql, [id], map_template_item_row)
                .map_err(Into::into)
        })
    }

    /// Copy a template's items into a list.
    ///
    /// Sections are matched by name case-insensitively and created when
    /// missing. Returns the number of items added.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateNotFound` or `Error::ListNotFound`.
    pub fn apply_template(&mut self, template_id: i64, list_id: i64) -> Result<usize> {
        self.mutate("apply_template", |tx| {
            let template = get_template_tx(tx, template_id)?
                .ok_or(Error::TemplateNotFound { id: template_id })?;
            if get_list_tx(tx, list_id)?.is_none() {
                return Err(Error::ListNotFound { id: list_id });
            }

            for item in &template.items {
                let section_id = match section_id_by_name(tx, list_id, &item.section_name)? {
                    Some(id) => id,
                    None => insert_section(tx, list_id, &item.section_name)?,
                };
                insert_item(tx, section_id, &item.name, &item.description, false, false)?;
            }
            touch_list(tx, list_id)?;
            Ok(template.items.len())
        })
    }

    // ==================
    // Whole-database Operations
    // ==================

    /// Row counts; history is counted up to `history_limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn counts(&self, history_limit: Option<usize>) -> Result<DataCounts> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        };

        let history = count("SELECT COUNT(*) FROM item_history")?;
        Ok(DataCounts {
            lists: count("SELECT COUNT(*) FROM lists")?,
            items: count("SELECT COUNT(*) FROM items")?,
            templates: count("SELECT COUNT(*) FROM templates")?,
            history: history_limit.map_or(history, |limit| history.min(limit)),
        })
    }

    /// Delete every list, section, item, template, and history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a delete fails; nothing is removed in that case.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.mutate("clear_all_data", |tx| {
            tx.execute_batch(
                "DELETE FROM template_items;
                 DELETE FROM templates;
                 DELETE FROM item_history;
                 DELETE FROM items;
                 DELETE FROM sections;
                 DELETE FROM lists;
                 DELETE FROM sqlite_sequence
                  WHERE name IN ('lists', 'sections', 'items', 'item_history', 'templates', 'template_items');",
            )?;
            Ok(())
        })
    }
}

// ==================
// Transaction helpers
// ==================

/// Insert a list at the end of the display order. Returns the new ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_list(conn: &Connection, name: &str, icon: &str, is_active: bool) -> Result<i64> {
    let now = chrono::Utc::now().timestamp_millis();
    let sort_order: i64 =
        conn.query_row("SELECT COALESCE(MAX(sort_order), -1) + 1 FROM lists", [], |row| {
            row.get(0)
        })?;
    conn.execute(
        "INSERT INTO lists (name, icon, sort_order, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        rusqlite::params![name, icon, sort_order, is_active, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a section at the end of a list. Returns the new ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_section(conn: &Connection, list_id: i64, name: &str) -> Result<i64> {
    let now = chrono::Utc::now().timestamp_millis();
    let sort_order = next_sort_order(conn, "sections", "list_id", list_id)?;
    conn.execute(
        "INSERT INTO sections (list_id, name, sort_order, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![list_id, name, sort_order, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert an item at the end of a section. Returns the new ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_item(
    conn: &Connection,
    section_id: i64,
    name: &str,
    description: &str,
    completed: bool,
    uncertain: bool,
) -> Result<i64> {
    let now = chrono::Utc::now().timestamp_millis();
    let sort_order = next_sort_order(conn, "items", "section_id", section_id)?;
    conn.execute(
        "INSERT INTO items (section_id, name, description, completed, uncertain, sort_order, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        rusqlite::params![section_id, name, description, completed, uncertain, sort_order, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Delete a list (cascading). Returns the number of lists removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_list_tx(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM lists WHERE id = ?1", [id])?)
}

/// Find a section of `list_id` by name, ignoring case.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn section_id_by_name(conn: &Connection, list_id: i64, name: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM sections WHERE list_id = ?1 AND name = ?2 COLLATE NOCASE
         ORDER BY sort_order, id LIMIT 1",
        rusqlite::params![list_id, name],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Find any section by name, ignoring case.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn any_section_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM sections WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        [name],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Record one use of `name`. A known name keeps its old section when none is given.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub fn save_history_tx(conn: &Connection, name: &str, section_id: Option<i64>) -> Result<()> {
    let now = chrono::Utc::now().timestamp_millis();
    conn.execute(
        "INSERT INTO item_history (name, last_section_id, usage_count, last_used_at)
         VALUES (?1, ?2, 1, ?3)
         ON CONFLICT(name) DO UPDATE SET
            usage_count = usage_count + 1,
            last_section_id = COALESCE(excluded.last_section_id, last_section_id),
            last_used_at = excluded.last_used_at",
        rusqlite::params![name, section_id, now],
    )?;
    Ok(())
}

/// Upsert an imported history entry. The larger usage count wins.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub fn import_history_tx(
    conn: &Connection,
    name: &str,
    section_id: Option<i64>,
    usage_count: i64,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp_millis();
    conn.execute(
        "INSERT INTO item_history (name, last_section_id, usage_count, last_used_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET
            usage_count = MAX(usage_count, excluded.usage_count),
            last_section_id = COALESCE(excluded.last_section_id, last_section_id),
            last_used_at = excluded.last_used_at",
        rusqlite::params![name, section_id, usage_count.max(1), now],
    )?;
    Ok(())
}

/// Insert a template. Returns the new ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_template(conn: &Connection, name: &str, description: &str) -> Result<i64> {
    let now = chrono::Utc::now().timestamp_millis();
    conn.execute(
        "INSERT INTO templates (name, description, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, description, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a template item. Returns the new ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_template_item(
    conn: &Connection,
    template_id: i64,
    section_name: &str,
    name: &str,
    description: &str,
    sort_order: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO template_items (template_id, section_name, name, description, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![template_id, section_name, name, description, sort_order],
    )?;
    Ok(conn.last_insert_rowid())
}

fn next_sort_order(conn: &Connection, table: &str, parent_column: &str, parent_id: i64) -> Result<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM {table} WHERE {parent_column} = ?1"
    );
    Ok(conn.query_row(&sql, [parent_id], |row| row.get(0))?)
}

fn touch_list(conn: &Connection, list_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE lists SET updated_at = ?1 WHERE id = ?2",
        rusqlite::params![chrono::Utc::now().timestamp_millis(), list_id],
    )?;
    Ok(())
}

fn get_list_tx(conn: &Connection, id: i64) -> Result<Option<List>> {
    let sql = format!("SELECT {LIST_COLUMNS} FROM lists l WHERE l.id = ?1");
    conn.query_row(&sql, [id], map_list_row)
        .optional()
        .map_err(Into::into)
}

fn get_section_tx(conn: &Connection, id: i64) -> Result<Option<Section>> {
    let sql = format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = ?1");
    conn.query_row(&sql, [id], map_section_row)
        .optional()
        .map_err(Into::into)
}

fn get_item_tx(conn: &Connection, id: i64) -> Result<Option<Item>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
    conn.query_row(&sql, [id], map_item_row)
        .optional()
        .map_err(Into::into)
}

fn get_template_tx(conn: &Connection, id: i64) -> Result<Option<Template>> {
    let template = conn
        .query_row(
            "SELECT id, name, description, created_at FROM templates WHERE id = ?1",
            [id],
            |row| {
                Ok(Template {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    created_at: row.get(3)?,
                    items: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut template) = template else {
        return Ok(None);
    };

    let sql = format!(
        "SELECT {TEMPLATE_ITEM_COLUMNS} FROM template_items WHERE template_id = ?1
         ORDER BY sort_order, id"
    );
    template.items = conn
        .prepare(&sql)?
        .query_map([id], map_template_item_row)?
        .collect::<std::result::Result<_, _>>()?;
    Ok(Some(template))
}

/// Reorderable entities and the column that scopes their siblings.
#[derive(Clone, Copy)]
enum Sibling {
    List,
    Section,
    Item,
}

impl Sibling {
    const fn table(self) -> &'static str {
        match self {
            Self::List => "lists",
            Self::Section => "sections",
            Self::Item => "items",
        }
    }

    const fn parent_column(self) -> Option<&'static str> {
        match self {
            Self::List => None,
            Self::Section => Some("list_id"),
            Self::Item => Some("section_id"),
        }
    }
}

/// Swap `id` with its neighbour and renumber the siblings 0..n.
///
/// Returns `None` if `id` doesn't exist, `Some(false)` at the edge.
fn reorder_sibling(
    conn: &Connection,
    kind: Sibling,
    id: i64,
    direction: MoveDirection,
) -> Result<Option<bool>> {
    let table = kind.table();

    let ids: Vec<i64> = match kind.parent_column() {
        Some(parent) => {
            let parent_id: Option<i64> = conn
                .query_row(
                    &format!("SELECT {parent} FROM {table} WHERE id = ?1"),
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(parent_id) = parent_id else {
                return Ok(None);
            };
            conn.prepare(&format!(
                "SELECT id FROM {table} WHERE {parent} = ?1 ORDER BY sort_order, id"
            ))?
            .query_map([parent_id], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?
        }
        None => conn
            .prepare(&format!("SELECT id FROM {table} ORDER BY sort_order, id"))?
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?,
    };

    let Some(pos) = ids.iter().position(|&sibling| sibling == id) else {
        return Ok(None);
    };

    let target = match direction {
        MoveDirection::Up if pos > 0 => pos - 1,
        MoveDirection::Down if pos + 1 < ids.len() => pos + 1,
        _ => return Ok(Some(false)),
    };

    let mut ordered = ids;
    ordered.swap(pos, target);

    let mut stmt = conn.prepare(&format!("UPDATE {table} SET sort_order = ?1 WHERE id = ?2"))?;
    for (index, sibling) in ordered.iter().enumerate() {
        stmt.execute(rusqlite::params![i64::try_from(index).unwrap_or(i64::MAX), sibling])?;
    }
    Ok(Some(true))
}

// Helper to map list rows
fn map_list_row(row: &rusqlite::Row) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        sort_order: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        stats: Some(ListStats {
            total_items: row.get(7)?,
            completed_items: row.get(8)?,
        }),
    })
}

// Helper to map section rows
fn map_section_row(row: &rusqlite::Row) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get(0)?,
        list_id: row.get(1)?,
        name: row.get(2)?,
        sort_order: row.get(3)?,
        created_at: row.get(4)?,
        items: Vec::new(),
    })
}

// Helper to map item rows
fn map_item_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        section_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        uncertain: row.get(5)?,
        sort_order: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn map_history_row(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        last_section_id: row.get(2)?,
        last_section_name: row.get(3)?,
        usage_count: row.get(4)?,
        last_used_at: row.get(5)?,
    })
}

fn map_template_item_row(row: &rusqlite::Row) -> rusqlite::Result<TemplateItem> {
    Ok(TemplateItem {
        id: row.get(0)?,
        template_id: row.get(1)?,
        section_name: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        sort_order: row.get(5)?,
    })
}
