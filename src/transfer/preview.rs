//! Import preview.
//!
//! The preview is strict: any over-long name or description, or a list using
//! the reserved name, rejects the whole upload. The importer truncates the
//! same fields instead.

use std::collections::{HashMap, HashSet};

use super::conflict::NameLookup;
use super::csv_codec::{MIN_ROW_COLUMNS, cell, read_records};
use super::types::{
    APP_NAME, CSV_HEADER, Envelope, Format, ImportListInfo, ImportPreview, TransferError,
    TransferResult,
};
use crate::validate::{
    DEFAULT_LIST_ICON, MAX_DESCRIPTION_LENGTH, MAX_ITEM_NAME_LENGTH, MAX_LIST_NAME_LENGTH,
    MAX_SECTION_NAME_LENGTH, RESERVED_LIST_NAME, exceeds,
};

/// Preview an upload. Problems are reported in the result, never as an error.
#[must_use]
pub fn preview(
    data: &[u8],
    format: Format,
    delimiter: u8,
    existing: &NameLookup,
    lang: &str,
) -> ImportPreview {
    let result = match format {
        Format::Json => preview_json(data, existing, lang),
        Format::Csv => preview_csv(data, delimiter, existing),
    };
    result.unwrap_or_else(|e| ImportPreview::invalid(format, e.to_string()))
}

fn invalid<T>(message: impl Into<String>) -> TransferResult<T> {
    Err(TransferError::Invalid(message.into()))
}

/// Preview an export document.
///
/// # Errors
///
/// Returns `TransferError` describing the first problem found.
pub fn preview_json(data: &[u8], existing: &NameLookup, lang: &str) -> TransferResult<ImportPreview> {
    let envelope: Envelope = serde_json::from_slice(data)?;

    if envelope.app != APP_NAME && !envelope.app.is_empty() {
        return invalid("This file was not exported from Koffan");
    }

    let data = envelope.data;
    let mut preview = ImportPreview {
        valid: true,
        format: Format::Json.as_str().to_string(),
        lists_count: data.lists.len(),
        templates_count: data.templates.len(),
        history_count: data.history.len(),
        ..ImportPreview::default()
    };

    for list in &data.lists {
        if exceeds(&list.name, MAX_LIST_NAME_LENGTH) {
            return invalid(format!("List name too long: {}", list.name));
        }
        if list.name == RESERVED_LIST_NAME {
            return invalid(crate::i18n::get(lang, "common.reserved_name"));
        }

        for section in &list.sections {
            if exceeds(&section.name, MAX_SECTION_NAME_LENGTH) {
                return invalid(format!(
                    "Section name too long in list '{}': {}",
                    list.name, section.name
                ));
            }
            for item in &section.items {
                if exceeds(&item.name, MAX_ITEM_NAME_LENGTH) {
                    return invalid(format!(
                        "Item name too long in list '{}': {}",
                        list.name, item.name
                    ));
                }
                if exceeds(&item.description, MAX_DESCRIPTION_LENGTH) {
                    return invalid(format!(
                        "Item description too long in list '{}', item '{}'",
                        list.name, item.name
                    ));
                }
            }
        }

        let has_conflict = existing.contains(&list.name);
        if has_conflict {
            preview.conflicting_lists.push(list.name.clone());
        }
        let items = list.item_count();
        preview.items_count += items;
        preview.lists.push(ImportListInfo {
            name: list.name.clone(),
            icon: list.icon.clone(),
            sections: list.sections.len(),
            items,
            has_conflict,
        });
    }

    Ok(preview)
}

/// Preview a CSV table. Row numbers in messages are 1-based and count the header.
///
/// # Errors
///
/// Returns `TransferError` describing the first problem found.
pub fn preview_csv(data: &[u8], delimiter: u8, existing: &NameLookup) -> TransferResult<ImportPreview> {
    let records = read_records(data, delimiter)?;

    if records.len() < 2 {
        return invalid("CSV file is empty or has no data rows");
    }
    if records[0].len() < CSV_HEADER.len() {
        return invalid(format!(
            "Invalid CSV header. Expected: {}",
            CSV_HEADER.join(", ")
        ));
    }

    let mut lists: Vec<ImportListInfo> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut sections: HashSet<(usize, String)> = HashSet::new();
    let mut history_count = 0;

    for (idx, row) in records.iter().enumerate().skip(1) {
        let row_num = idx + 1;
        if row.len() < MIN_ROW_COLUMNS {
            return invalid(format!("Invalid row {row_num}: not enough columns"));
        }

        let list_name = cell(row, 0);
        if list_name.is_empty() {
            continue;
        }
        if list_name == RESERVED_LIST_NAME {
            history_count += 1;
            continue;
        }
        if exceeds(list_name, MAX_LIST_NAME_LENGTH) {
            return invalid(format!("List name too long in row {row_num}"));
        }

        let item_name = cell(row, 3);
        if exceeds(item_name, MAX_ITEM_NAME_LENGTH) {
            return invalid(format!("Item name too long in row {row_num}: {item_name}"));
        }
        if exceeds(cell(row, 4), MAX_DESCRIPTION_LENGTH) {
            return invalid(format!("Item description too long in row {row_num}"));
        }

        let pos = *by_key.entry(list_name.to_lowercase()).or_insert_with(|| {
            let icon = row.get(1).filter(|i| !i.is_empty()).map_or(DEFAULT_LIST_ICON, String::as_str);
            lists.push(ImportListInfo {
                name: list_name.to_string(),
                icon: icon.to_string(),
                sections: 0,
                items: 0,
                has_conflict: existing.contains(list_name),
            });
            lists.len() - 1
        });

        let section_key = cell(row, 2).to_lowercase();
        if sections.insert((pos, section_key)) {
            lists[pos].sections += 1;
        }
        if !item_name.is_empty() {
            lists[pos].items += 1;
        }
    }

    Ok(ImportPreview {
        valid: true,
        error: None,
        format: Format::Csv.as_str().to_string(),
        lists_count: lists.len(),
        items_count: lists.iter().map(|l| l.items).sum(),
        templates_count: 0,
        history_count,
        conflicting_lists: lists
            .iter()
            .filter(|l| l.has_conflict)
            .map(|l| l.name.clone())
            .collect(),
        lists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_with_item(name: &str) -> String {
        serde_json::json!({
            "version": "1.0",
            "app": "koffan",
            "data": {
                "lists": [{
                    "name": "Groceries",
                    "icon": "🛒",
                    "sections": [{"name": "Dairy", "items": [{"name": name}]}]
                }],
                "history": [{"name": "Milk", "last_section": "Dairy", "usage_count": 3}]
            }
        })
        .to_string()
    }

    #[test]
    fn test_json_preview_counts_and_conflicts() {
        let existing = NameLookup::from_existing([("GROCERIES", 1)]);
        let result = preview(
            envelope_with_item("Milk").as_bytes(),
            Format::Json,
            b',',
            &existing,
            "en",
        );
        assert!(result.valid);
        assert_eq!(result.lists_count, 1);
        assert_eq!(result.items_count, 1);
        assert_eq!(result.history_count, 1);
        assert_eq!(result.conflicting_lists, vec!["Groceries".to_string()]);
        assert!(result.lists[0].has_conflict);
    }

    #[test]
    fn test_json_preview_rejects_long_item_name() {
        let long = "x".repeat(201);
        let result = preview(
            envelope_with_item(&long).as_bytes(),
            Format::Json,
            b',',
            &NameLookup::new(),
            "en",
        );
        assert!(!result.valid);
        assert!(result.error.unwrap().starts_with("Item name too long in list 'Groceries'"));
    }

    #[test]
    fn test_json_preview_rejects_foreign_app() {
        let doc = r#"{"app":"other","data":{"lists":[]}}"#;
        let result = preview(doc.as_bytes(), Format::Json, b',', &NameLookup::new(), "en");
        assert_eq!(result.error.as_deref(), Some("This file was not exported from Koffan"));
    }

    #[test]
    fn test_json_preview_rejects_reserved_name() {
        let doc = r#"{"app":"koffan","data":{"lists":[{"name":"[HISTORY]"}]}}"#;
        let result = preview(doc.as_bytes(), Format::Json, b',', &NameLookup::new(), "en");
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("This name is reserved"));
    }

    #[test]
    fn test_json_preview_malformed() {
        let result = preview(b"{not json", Format::Json, b',', &NameLookup::new(), "en");
        assert!(!result.valid);
        assert!(result.error.unwrap().starts_with("Invalid JSON format"));
    }

    #[test]
    fn test_csv_preview() {
        let data = "list_name,list_icon,section_name,item_name,item_description,item_completed,item_uncertain
Groceries,,Dairy,Milk,,,
Groceries,,Dairy,Butter,,,
Groceries,,Bakery,Bread,,,
[HISTORY],,Milk,Dairy,2,,
Party,🎉,Drinks,,,,
";
        let existing = NameLookup::from_existing([("party", 3)]);
        let result = preview(data.as_bytes(), Format::Csv, b',', &existing, "en");
        assert!(result.valid, "{:?}", result.error);
        assert_eq!(result.lists_count, 2);
        assert_eq!(result.items_count, 3);
        assert_eq!(result.history_count, 1);
        assert_eq!(result.lists[0].icon, DEFAULT_LIST_ICON);
        assert_eq!(result.lists[0].sections, 2);
        assert_eq!(result.conflicting_lists, vec!["Party".to_string()]);
    }

    #[test]
    fn test_csv_preview_row_errors() {
        let short = "list_name,list_icon,section_name,item_name,item_description,item_completed,item_uncertain\nA,,S\n";
        let result = preview(short.as_bytes(), Format::Csv, b',', &NameLookup::new(), "en");
        assert_eq!(result.error.as_deref(), Some("Invalid row 2: not enough columns"));

        let long_desc = format!(
            "list_name,list_icon,section_name,item_name,item_description,item_completed,item_uncertain\nA,,S,Milk,{},,\n",
            "d".repeat(501)
        );
        let result = preview(long_desc.as_bytes(), Format::Csv, b',', &NameLookup::new(), "en");
        assert_eq!(result.error.as_deref(), Some("Item description too long in row 2"));
    }

    #[test]
    fn test_csv_preview_bad_header() {
        let data = "name,icon\nA,B\n";
        let result = preview(data.as_bytes(), Format::Csv, b',', &NameLookup::new(), "en");
        assert!(result.error.unwrap().starts_with("Invalid CSV header"));
    }

    #[test]
    fn test_csv_preview_needs_data_rows() {
        let result = preview(CSV_HEADER.join(",").as_bytes(), Format::Csv, b',', &NameLookup::new(), "en");
        assert_eq!(result.error.as_deref(), Some("CSV file is empty or has no data rows"));
    }
}
