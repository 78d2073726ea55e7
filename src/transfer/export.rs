//! Export to JSON and CSV.
//!
//! JSON exports use the versioned [`Envelope`]. CSV exports start with a
//! UTF-8 BOM and the fixed seven-column header; history rows follow all list
//! rows, marked with `[HISTORY]` in the first column.

use chrono::SecondsFormat;

use super::csv_codec;
use super::types::{
    APP_NAME, DataBody, EXPORT_VERSION, Envelope, ExportFile, ExportOptions, ExportPreview,
    Format, HISTORY_EXPORT_LIMIT, HISTORY_PREVIEW_LIMIT, HistoryRecord, ItemRecord, ListRecord,
    SectionRecord, TemplateItemRecord, TemplateRecord, TransferResult,
};
use crate::model::List;
use crate::storage::sqlite::SqliteStorage;
use crate::validate::RESERVED_LIST_NAME;

/// Exporter reading from the store.
pub struct Exporter<'a> {
    storage: &'a SqliteStorage,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(storage: &'a SqliteStorage) -> Self {
        Self { storage }
    }

    /// Export every list, optionally with templates and history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or encoding fails.
    pub fn export_all(&self, options: &ExportOptions) -> TransferResult<ExportFile> {
        let lists = self.storage.list_lists()?;
        let filename = export_filename(None, options.format, &today());

        let body = match options.format {
            Format::Json => {
                let mut data = DataBody {
                    lists: self.list_records(&lists)?,
                    ..DataBody::default()
                };
                if options.include_templates {
                    data.templates = self.template_records()?;
                }
                if options.include_history {
                    data.history = self.history_records()?;
                }
                encode_json(data)?
            }
            Format::Csv => {
                let mut rows = Vec::new();
                for record in self.list_records(&lists)? {
                    rows.extend(list_rows(&record));
                }
                if options.include_history {
                    rows.extend(self.history_records()?.iter().map(history_row));
                }
                csv_codec::encode(rows, options.delimiter)?
            }
        };

        Ok(ExportFile {
            filename,
            content_type: options.format.content_type(),
            body,
        })
    }

    /// Export one list. Returns `None` if the list doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or encoding fails.
    pub fn export_list(
        &self,
        list_id: i64,
        format: Format,
        delimiter: u8,
    ) -> TransferResult<Option<ExportFile>> {
        let Some(list) = self.storage.get_list(list_id)? else {
            return Ok(None);
        };

        let record = self.list_record(&list)?;
        let filename = export_filename(Some(&list.name), format, &today());
        let body = match format {
            Format::Json => encode_json(DataBody {
                lists: vec![record],
                ..DataBody::default()
            })?,
            Format::Csv => csv_codec::encode(list_rows(&record), delimiter)?,
        };

        Ok(Some(ExportFile {
            filename,
            content_type: format.content_type(),
            body,
        }))
    }

    /// Counts of what a full export would contain.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn preview(&self) -> TransferResult<ExportPreview> {
        let counts = self.storage.counts(Some(HISTORY_PREVIEW_LIMIT))?;
        Ok(ExportPreview {
            lists_count: counts.lists,
            items_count: counts.items,
            templates_count: counts.templates,
            history_count: counts.history,
        })
    }

    fn list_records(&self, lists: &[List]) -> TransferResult<Vec<ListRecord>> {
        lists.iter().map(|list| self.list_record(list)).collect()
    }

    fn list_record(&self, list: &List) -> TransferResult<ListRecord> {
        let sections = self.storage.list_sections_with_items(list.id)?;
        Ok(ListRecord {
            name: list.name.clone(),
            icon: list.icon.clone(),
            is_active: list.is_active,
            sections: sections
                .into_iter()
                .map(|section| SectionRecord {
                    name: section.name,
                    items: section
                        .items
                        .into_iter()
                        .map(|item| ItemRecord {
                            name: item.name,
                            description: item.description,
                            completed: item.completed,
                            uncertain: item.uncertain,
                        })
                        .collect(),
                })
                .collect(),
        })
    }

    fn template_records(&self) -> TransferResult<Vec<TemplateRecord>> {
        Ok(self
            .storage
            .list_templates()?
            .into_iter()
            .map(|template| TemplateRecord {
                name: template.name,
                description: template.description,
                items: template
                    .items
                    .into_iter()
                    .map(|item| TemplateItemRecord {
                        section_name: item.section_name,
                        name: item.name,
                        description: item.description,
                    })
                    .collect(),
            })
            .collect())
    }

    /// Most-used history entries. A missing last section falls back to the
    /// section where an item of that name currently lives.
    fn history_records(&self) -> TransferResult<Vec<HistoryRecord>> {
        let entries = self.storage.list_history(Some(HISTORY_EXPORT_LIMIT))?;
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let last_section = match entry.last_section_name {
                Some(name) if !name.is_empty() => name,
                _ => self
                    .storage
                    .section_name_for_item(&entry.name)?
                    .unwrap_or_default(),
            };
            records.push(HistoryRecord {
                name: entry.name,
                last_section,
                usage_count: entry.usage_count,
            });
        }
        Ok(records)
    }
}

fn encode_json(data: DataBody) -> TransferResult<Vec<u8>> {
    let envelope = Envelope {
        version: EXPORT_VERSION.to_string(),
        exported_at: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        app: APP_NAME.to_string(),
        data,
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// CSV rows for one list; a list without items yields a single name/icon row.
fn list_rows(list: &ListRecord) -> Vec<[String; 7]> {
    let mut rows: Vec<[String; 7]> = list
        .sections
        .iter()
        .flat_map(|section| {
            section.items.iter().map(|item| {
                [
                    list.name.clone(),
                    list.icon.clone(),
                    section.name.clone(),
                    item.name.clone(),
                    item.description.clone(),
                    item.completed.to_string(),
                    item.uncertain.to_string(),
                ]
            })
        })
        .collect();

    if rows.is_empty() {
        rows.push([
            list.name.clone(),
            list.icon.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ]);
    }
    rows
}

fn history_row(record: &HistoryRecord) -> [String; 7] {
    [
        RESERVED_LIST_NAME.to_string(),
        String::new(),
        record.name.clone(),
        record.last_section.clone(),
        record.usage_count.to_string(),
        String::new(),
        String::new(),
    ]
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Keep ASCII letters, digits, `-` and `_`; spaces become `-`.
///
/// An empty result becomes `list`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => Some(c),
            ' ' => Some('-'),
            _ => None,
        })
        .collect();

    if cleaned.is_empty() {
        "list".to_string()
    } else {
        cleaned
    }
}

/// `koffan-export-DATE.ext` for full exports, `koffan-NAME-DATE.ext` for one list.
#[must_use]
pub fn export_filename(list_name: Option<&str>, format: Format, date: &str) -> String {
    let ext = format.as_str();
    match list_name {
        Some(name) => format!("koffan-{}-{date}.{ext}", sanitize_filename(name)),
        None => format!("koffan-export-{date}.{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::types::UTF8_BOM;

    fn seeded() -> SqliteStorage {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let list = storage.create_list("Groceries", "🛒").unwrap();
        let section = storage.create_section(list.id, "Dairy").unwrap();
        storage.create_item(section.id, "Milk", "whole, 2l").unwrap();
        storage.create_list("Empty", "📦").unwrap();
        storage
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Weekly Shop #1"), "Weekly-Shop-1");
        assert_eq!(sanitize_filename("Zakupy_świąteczne"), "Zakupy_witeczne");
        assert_eq!(sanitize_filename("🎉🎉"), "list");
        assert_eq!(sanitize_filename(""), "list");
    }

    #[test]
    fn test_export_filenames() {
        assert_eq!(
            export_filename(None, Format::Json, "2025-01-31"),
            "koffan-export-2025-01-31.json"
        );
        assert_eq!(
            export_filename(Some("My List"), Format::Csv, "2025-01-31"),
            "koffan-My-List-2025-01-31.csv"
        );
    }

    #[test]
    fn test_csv_export_layout() {
        let storage = seeded();
        let options = ExportOptions {
            format: Format::Csv,
            ..ExportOptions::default()
        };
        let file = Exporter::new(&storage).export_all(&options).unwrap();

        assert!(file.body.starts_with(UTF8_BOM));
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
        assert!(file.filename.starts_with("koffan-export-"));

        let text = String::from_utf8(file.body[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "list_name,list_icon,section_name,item_name,item_description,item_completed,item_uncertain"
        );
        assert_eq!(lines[1], "Groceries,🛒,Dairy,Milk,\"whole, 2l\",false,false");
        assert_eq!(lines[2], "Empty,📦,,,,,");
        assert_eq!(lines[3], "[HISTORY],,Milk,Dairy,1,,");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_export_without_history() {
        let storage = seeded();
        let options = ExportOptions {
            format: Format::Csv,
            include_history: false,
            delimiter: b';',
            ..ExportOptions::default()
        };
        let file = Exporter::new(&storage).export_all(&options).unwrap();
        let text = String::from_utf8(file.body[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(!text.contains("[HISTORY]"));
        assert!(text.contains("Groceries;🛒;Dairy;Milk;whole, 2l;false;false"));
    }

    #[test]
    fn test_json_export_envelope() {
        let storage = seeded();
        let file = Exporter::new(&storage)
            .export_all(&ExportOptions::default())
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&file.body).unwrap();

        assert_eq!(json["app"], "koffan");
        assert_eq!(json["version"], "1.0");
        assert!(json["exported_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(json["data"]["lists"][0]["sections"][0]["items"][0]["name"], "Milk");
        assert_eq!(json["data"]["lists"][1]["sections"], serde_json::json!([]));
        assert_eq!(json["data"]["history"][0]["last_section"], "Dairy");
        assert!(json["data"].get("templates").is_none());
    }

    #[test]
    fn test_history_section_fallback() {
        let mut storage = seeded();
        let list_id = storage.list_lists().unwrap()[0].id;
        let section = storage.list_sections(list_id).unwrap()[0].clone();
        storage.save_history("Cheese", None).unwrap();
        storage.create_item(section.id, "Cheese", "").unwrap();
        storage.conn().execute("UPDATE item_history SET last_section_id = NULL", []).unwrap();

        let records = Exporter::new(&storage).history_records().unwrap();
        let cheese = records.iter().find(|r| r.name == "Cheese").unwrap();
        assert_eq!(cheese.last_section, "Dairy");
    }

    #[test]
    fn test_single_list_export() {
        let storage = seeded();
        let id = storage.list_lists().unwrap()[1].id;
        let file = Exporter::new(&storage)
            .export_list(id, Format::Csv, b',')
            .unwrap()
            .unwrap();
        assert!(file.filename.starts_with("koffan-Empty-"));
        let text = String::from_utf8(file.body[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().nth(1), Some("Empty,📦,,,,,"));

        assert!(Exporter::new(&storage).export_list(999, Format::Json, b',').unwrap().is_none());
    }

    #[test]
    fn test_export_preview() {
        let storage = seeded();
        let preview = Exporter::new(&storage).preview().unwrap();
        assert_eq!(preview.lists_count, 2);
        assert_eq!(preview.items_count, 1);
        assert_eq!(preview.templates_count, 0);
        assert_eq!(preview.history_count, 1);
    }
}
