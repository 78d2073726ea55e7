//! Import of JSON and CSV uploads.
//!
//! An import runs in one transaction. A row that fails to insert is logged and
//! skipped; a failed lookup or a failure to begin or commit aborts the import.
//! Over-long fields are truncated to their limits.

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::conflict::{NameLookup, Resolution, resolve};
use super::csv_codec;
use super::types::{
    DataBody, Envelope, Format, HistoryRecord, ImportOptions, ImportStats, ListRecord,
    TemplateRecord, TransferResult,
};
use crate::storage::sqlite::{
    SqliteStorage, any_section_id_by_name, delete_list_tx, import_history_tx, insert_item,
    insert_list, insert_section, insert_template, insert_template_item,
};
use crate::validate::{
    MAX_DESCRIPTION_LENGTH, MAX_ITEM_NAME_LENGTH, MAX_LIST_NAME_LENGTH, MAX_SECTION_NAME_LENGTH,
    MAX_TEMPLATE_NAME_LENGTH, RESERVED_LIST_NAME, normalize_icon, truncate_chars,
};

/// Importer for uploaded export files.
pub struct Importer<'a> {
    storage: &'a mut SqliteStorage,
    options: ImportOptions,
}

impl<'a> Importer<'a> {
    #[must_use]
    pub fn new(storage: &'a mut SqliteStorage, options: ImportOptions) -> Self {
        Self { storage, options }
    }

    /// Decode and import an upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload cannot be decoded or the transaction fails.
    pub fn import(&mut self, data: &[u8], format: Format) -> TransferResult<ImportStats> {
        let body = match format {
            Format::Json => serde_json::from_slice::<Envelope>(data)?.data,
            Format::Csv => csv_codec::decode(
                data,
                self.options.delimiter,
                &crate::i18n::default_section_name(&self.options.lang),
            )?,
        };
        self.import_body(body)
    }

    /// Import decoded data: lists first, then templates, then history.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be committed.
    pub fn import_body(&mut self, body: DataBody) -> TransferResult<ImportStats> {
        let existing = self.storage.list_lists()?;
        let mut lookup = NameLookup::from_existing(existing.iter().map(|l| (l.name.as_str(), l.id)));
        let options = &self.options;

        let stats = self.storage.mutate("import", |tx| {
            let mut stats = ImportStats::default();
            for list in &body.lists {
                import_list(tx, list, options, &mut lookup, &mut stats)?;
            }
            for template in &body.templates {
                if import_template(tx, template) {
                    stats.imported_templates += 1;
                }
            }
            for record in &body.history {
                if import_history(tx, record) {
                    stats.imported_history += 1;
                }
            }
            Ok(stats)
        })?;

        info!(
            lists = stats.imported_lists,
            items = stats.imported_items,
            templates = stats.imported_templates,
            history = stats.imported_history,
            skipped = stats.skipped_lists,
            skipped_items = stats.skipped_items,
            "Import complete"
        );
        Ok(stats)
    }
}

fn import_list(
    conn: &Connection,
    list: &ListRecord,
    options: &ImportOptions,
    lookup: &mut NameLookup,
    stats: &mut ImportStats,
) -> rusqlite::Result<()> {
    if list.name == RESERVED_LIST_NAME {
        stats.skipped_lists += 1;
        return Ok(());
    }
    if list.name.trim().is_empty() {
        debug!("Skipping list without a name");
        stats.skipped_lists += 1;
        return Ok(());
    }

    let name = truncate_chars(&list.name, MAX_LIST_NAME_LENGTH);
    let name = match resolve(&name, options.resolution, &options.copy_suffix, lookup) {
        Resolution::Skip => {
            debug!(list = %name, "Skipping conflicting list");
            stats.skipped_lists += 1;
            return Ok(());
        }
        Resolution::Replace { name, existing_id } => {
            if let Some(id) = existing_id {
                if let Err(e) = delete_list_tx(conn, id) {
                    warn!(list = %name, error = %e, "Failed to replace list");
                    return Ok(());
                }
            }
            name
        }
        Resolution::Create(name) => name,
    };

    let make_active = list.is_active && !has_active_list(conn)?;
    let list_id = match insert_list(conn, &name, &normalize_icon(&list.icon), make_active) {
        Ok(id) => id,
        Err(e) => {
            warn!(list = %name, error = %e, "Failed to create list");
            return Ok(());
        }
    };
    lookup.record(&name, list_id);
    stats.imported_lists += 1;

    for section in &list.sections {
        let section_name = truncate_chars(&section.name, MAX_SECTION_NAME_LENGTH);
        let section_id = match insert_section(conn, list_id, &section_name) {
            Ok(id) => id,
            Err(e) => {
                warn!(section = %section_name, error = %e, "Failed to create section");
                continue;
            }
        };

        for item in &section.items {
            if item.name.is_empty() {
                stats.skipped_items += 1;
                continue;
            }
            let item_name = truncate_chars(&item.name, MAX_ITEM_NAME_LENGTH);
            let description = truncate_chars(&item.description, MAX_DESCRIPTION_LENGTH);
            match insert_item(
                conn,
                section_id,
                &item_name,
                &description,
                item.completed,
                item.uncertain,
            ) {
                Ok(_) => stats.imported_items += 1,
                Err(e) => warn!(item = %item_name, error = %e, "Failed to create item"),
            }
        }
    }
    Ok(())
}

fn has_active_list(conn: &Connection) -> rusqlite::Result<bool> {
    conn.prepare("SELECT 1 FROM lists WHERE is_active = 1")?
        .exists([])
}

fn import_template(conn: &Connection, template: &TemplateRecord) -> bool {
    let name = truncate_chars(&template.name, MAX_TEMPLATE_NAME_LENGTH);
    let description = truncate_chars(&template.description, MAX_DESCRIPTION_LENGTH);
    let template_id = match insert_template(conn, &name, &description) {
        Ok(id) => id,
        Err(e) => {
            warn!(template = %name, error = %e, "Failed to create template");
            return false;
        }
    };

    for (order, item) in (0_i64..).zip(&template.items) {
        let result = insert_template_item(
            conn,
            template_id,
            &truncate_chars(&item.section_name, MAX_SECTION_NAME_LENGTH),
            &truncate_chars(&item.name, MAX_ITEM_NAME_LENGTH),
            &truncate_chars(&item.description, MAX_DESCRIPTION_LENGTH),
            order,
        );
        if let Err(e) = result {
            warn!(template = %name, error = %e, "Failed to add template item");
        }
    }
    true
}

fn import_history(conn: &Connection, record: &HistoryRecord) -> bool {
    let name = truncate_chars(record.name.trim(), MAX_ITEM_NAME_LENGTH);
    if name.is_empty() {
        return false;
    }

    let section_id = if record.last_section.is_empty() {
        None
    } else {
        any_section_id_by_name(conn, &record.last_section).unwrap_or(None)
    };

    match import_history_tx(conn, &name, section_id, record.usage_count.max(1)) {
        Ok(()) => true,
        Err(e) => {
            warn!(name = %name, error = %e, "Failed to import history entry");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::export::Exporter;
    use crate::transfer::types::{
        ConflictResolution, ExportOptions, ItemRecord, SectionRecord, TemplateItemRecord,
    };

    fn list(name: &str, items: &[&str]) -> ListRecord {
        ListRecord {
            name: name.to_string(),
            icon: "🛒".to_string(),
            is_active: false,
            sections: vec![SectionRecord {
                name: "Dairy".to_string(),
                items: items
                    .iter()
                    .map(|n| ItemRecord {
                        name: (*n).to_string(),
                        ..ItemRecord::default()
                    })
                    .collect(),
            }],
        }
    }

    fn body(lists: Vec<ListRecord>) -> DataBody {
        DataBody {
            lists,
            ..DataBody::default()
        }
    }

    fn options(resolution: ConflictResolution) -> ImportOptions {
        ImportOptions {
            resolution,
            ..ImportOptions::default()
        }
    }

    #[test]
    fn test_skip_creates_nothing() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create_list("Groceries", "🛒").unwrap();

        let stats = Importer::new(&mut storage, options(ConflictResolution::Skip))
            .import_body(body(vec![list("GROCERIES", &["Milk"])]))
            .unwrap();

        assert_eq!(stats.skipped_lists, 1);
        assert_eq!(stats.imported_lists, 0);
        assert_eq!(stats.imported_items, 0);
        assert_eq!(storage.list_lists().unwrap().len(), 1);
        assert_eq!(storage.counts(None).unwrap().items, 0);
    }

    #[test]
    fn test_copy_twice_in_one_batch() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create_list("X", "🛒").unwrap();

        let stats = Importer::new(&mut storage, options(ConflictResolution::Copy))
            .import_body(body(vec![list("X", &[]), list("X", &[])]))
            .unwrap();
        assert_eq!(stats.imported_lists, 2);

        let names: Vec<String> = storage
            .list_lists()
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["X", "X (copy)", "X (copy 2)"]);
    }

    #[test]
    fn test_same_name_twice_in_one_batch() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let stats = Importer::new(&mut storage, options(ConflictResolution::Skip))
            .import_body(body(vec![list("Y", &["Milk"]), list("y", &["Eggs"])]))
            .unwrap();
        assert_eq!(stats.imported_lists, 1);
        assert_eq!(stats.skipped_lists, 1);
        assert_eq!(storage.list_lists().unwrap().len(), 1);

        let mut storage = SqliteStorage::open_memory().unwrap();
        let stats = Importer::new(&mut storage, options(ConflictResolution::Replace))
            .import_body(body(vec![list("Z", &["Milk"]), list("z", &["Eggs"])]))
            .unwrap();
        assert_eq!(stats.imported_lists, 2);
        let lists = storage.list_lists().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "z");
        assert_eq!(storage.counts(None).unwrap().items, 1);
    }

    #[test]
    fn test_copy_avoids_names_created_in_batch() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create_list("X", "🛒").unwrap();

        Importer::new(&mut storage, options(ConflictResolution::Copy))
            .import_body(body(vec![list("X (copy)", &[]), list("X", &[])]))
            .unwrap();

        let names: Vec<String> = storage
            .list_lists()
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["X", "X (copy)", "X (copy 2)"]);
    }

    #[test]
    fn test_unnamed_items_counted_as_skipped() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let stats = Importer::new(&mut storage, ImportOptions::default())
            .import_body(body(vec![list("Party", &["Chips", "", ""])]))
            .unwrap();
        assert_eq!(stats.imported_items, 1);
        assert_eq!(stats.skipped_items, 2);
        assert_eq!(storage.counts(None).unwrap().items, 1);
    }

    #[test]
    fn test_active_list_check_propagates_errors() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(has_active_list(&conn).is_err());
    }

    #[test]
    fn test_replace_deletes_existing() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let old = storage.create_list("Groceries", "🛒").unwrap();
        let section = storage.create_section(old.id, "Old").unwrap();
        storage.create_item(section.id, "Stale", "").unwrap();

        let stats = Importer::new(&mut storage, options(ConflictResolution::Replace))
            .import_body(body(vec![list("groceries", &["Milk"])]))
            .unwrap();
        assert_eq!(stats.imported_lists, 1);

        let lists = storage.list_lists().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "groceries");
        assert!(storage.get_list(old.id).unwrap().is_none());
        assert_eq!(storage.counts(None).unwrap().items, 1);
    }

    #[test]
    fn test_reserved_list_counted_as_skipped() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let stats = Importer::new(&mut storage, ImportOptions::default())
            .import_body(body(vec![list(RESERVED_LIST_NAME, &["Milk"])]))
            .unwrap();
        assert_eq!(stats.skipped_lists, 1);
        assert!(storage.list_lists().unwrap().is_empty());
    }

    #[test]
    fn test_long_fields_truncated() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let long_name = "ą".repeat(250);
        let mut record = list(&"L".repeat(150), &[&long_name]);
        record.icon = "not-an-emoji-icon".to_string();
        record.sections[0].items[0].description = "d".repeat(600);

        Importer::new(&mut storage, ImportOptions::default())
            .import_body(body(vec![record]))
            .unwrap();

        let lists = storage.list_lists().unwrap();
        assert_eq!(lists[0].name.chars().count(), 100);
        assert_eq!(lists[0].icon, "🛒");
        let sections = storage.list_sections_with_items(lists[0].id).unwrap();
        let item = &sections[0].items[0];
        assert_eq!(item.name.chars().count(), 200);
        assert_eq!(item.description.len(), 500);
    }

    #[test]
    fn test_templates_and_history_imported() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let data = DataBody {
            lists: vec![list("Groceries", &["Milk"])],
            templates: vec![TemplateRecord {
                name: "Breakfast".into(),
                description: String::new(),
                items: vec![TemplateItemRecord {
                    section_name: "Dairy".into(),
                    name: "Yogurt".into(),
                    description: String::new(),
                }],
            }],
            history: vec![
                HistoryRecord {
                    name: "Milk".into(),
                    last_section: "dairy".into(),
                    usage_count: 4,
                },
                HistoryRecord {
                    name: "Eggs".into(),
                    last_section: "Nowhere".into(),
                    usage_count: 0,
                },
            ],
        };

        let stats = Importer::new(&mut storage, ImportOptions::default())
            .import_body(data)
            .unwrap();
        assert_eq!(stats.imported_templates, 1);
        assert_eq!(stats.imported_history, 2);

        let templates = storage.list_templates().unwrap();
        assert_eq!(templates[0].items[0].name, "Yogurt");

        let history = storage.list_history(None).unwrap();
        assert_eq!(history[0].name, "Milk");
        assert_eq!(history[0].usage_count, 4);
        assert_eq!(history[0].last_section_name.as_deref(), Some("Dairy"));
        assert_eq!(history[1].usage_count, 1);
        assert_eq!(history[1].last_section_id, None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut source = SqliteStorage::open_memory().unwrap();
        let list_rec = source.create_list("Groceries", "🥦").unwrap();
        let dairy = source.create_section(list_rec.id, "Dairy").unwrap();
        let bakery = source.create_section(list_rec.id, "Bakery").unwrap();
        let milk = source.create_item(dairy.id, "Milk", "2 liters").unwrap();
        source.create_item(dairy.id, "Butter", "").unwrap();
        let bread = source.create_item(bakery.id, "Bread", "").unwrap();
        source.toggle_item_completed(milk.id).unwrap();
        source.toggle_item_uncertain(bread.id).unwrap();

        let file = Exporter::new(&source)
            .export_all(&ExportOptions::default())
            .unwrap();

        let mut target = SqliteStorage::open_memory().unwrap();
        Importer::new(&mut target, options(ConflictResolution::Replace))
            .import(&file.body, Format::Json)
            .unwrap();

        let lists = target.list_lists().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Groceries");
        assert_eq!(lists[0].icon, "🥦");
        assert!(lists[0].is_active);

        let sections = target.list_sections_with_items(lists[0].id).unwrap();
        let shape: Vec<(String, Vec<(String, bool, bool)>)> = sections
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    s.items
                        .iter()
                        .map(|i| (i.name.clone(), i.completed, i.uncertain))
                        .collect(),
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                (
                    "Dairy".to_string(),
                    vec![
                        ("Milk".to_string(), true, false),
                        ("Butter".to_string(), false, false)
                    ]
                ),
                ("Bakery".to_string(), vec![("Bread".to_string(), false, true)]),
            ]
        );
        assert_eq!(sections[0].items[0].description, "2 liters");
    }

    #[test]
    fn test_csv_import() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let data = "\u{feff}list_name;list_icon;section_name;item_name;item_description;item_completed;item_uncertain
Groceries;🛒;;Milk;;true;
[HISTORY];;Milk;General;3;;
";
        let opts = ImportOptions {
            delimiter: b';',
            ..ImportOptions::default()
        };
        let stats = Importer::new(&mut storage, opts)
            .import(data.as_bytes(), Format::Csv)
            .unwrap();
        assert_eq!(stats.imported_lists, 1);
        assert_eq!(stats.imported_items, 1);
        assert_eq!(stats.imported_history, 1);

        let list_id = storage.list_lists().unwrap()[0].id;
        let sections = storage.list_sections_with_items(list_id).unwrap();
        assert_eq!(sections[0].name, "General");
        assert!(sections[0].items[0].completed);

        let history = storage.list_history(None).unwrap();
        assert_eq!(history[0].last_section_name.as_deref(), Some("General"));
    }

    #[test]
    fn test_csv_default_section_localized() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let data = "list_name,list_icon,section_name,item_name,item_description,item_completed,item_uncertain\nZakupy,,,Mleko,,,\n";
        let opts = ImportOptions {
            lang: "pl".into(),
            ..ImportOptions::default()
        };
        Importer::new(&mut storage, opts)
            .import(data.as_bytes(), Format::Csv)
            .unwrap();
        let list_id = storage.list_lists().unwrap()[0].id;
        assert_eq!(storage.list_sections(list_id).unwrap()[0].name, "Ogólne");
    }

    #[test]
    fn test_malformed_json_rejected() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let err = Importer::new(&mut storage, ImportOptions::default())
            .import(b"{oops", Format::Json)
            .unwrap_err();
        assert!(err.is_input_error());
    }
}
