//! CSV reading and writing.
//!
//! Uploads are read with a configurable single-byte delimiter and a flexible
//! row width; an optional UTF-8 BOM is stripped. Rows whose first column is
//! `[HISTORY]` carry history entries instead of items:
//!
//! ```text
//! [HISTORY],,item_name,last_section,usage_count,,
//! ```

use std::collections::HashMap;

use tracing::debug;

use super::types::{
    CSV_HEADER, DataBody, HistoryRecord, ItemRecord, ListRecord, SectionRecord, TransferError,
    TransferResult, UTF8_BOM,
};
use crate::validate::{
    MAX_LIST_NAME_LENGTH, MAX_SECTION_NAME_LENGTH, RESERVED_LIST_NAME, truncate_chars,
};

/// Minimum number of columns for an item row to be considered.
pub const MIN_ROW_COLUMNS: usize = 4;

/// Remove a leading UTF-8 byte-order mark.
#[must_use]
pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Read every record, header included.
///
/// # Errors
///
/// Returns `TransferError::Csv` for malformed quoting or invalid UTF-8.
pub fn read_records(data: &[u8], delimiter: u8) -> TransferResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(strip_bom(data));

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

/// Trimmed cell `idx` of `row`, empty when missing.
#[must_use]
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map_or("", |c| c.trim())
}

/// CSV boolean: true only for a `true` cell, ignoring case.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Usage count from a history row; non-positive or unparseable means 1.
#[must_use]
pub fn parse_usage_count(value: &str) -> i64 {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0).unwrap_or(1)
}

/// Parse a history row, `None` when the item name is blank.
#[must_use]
pub fn history_from_row(row: &[String]) -> Option<HistoryRecord> {
    let name = cell(row, 2);
    if name.is_empty() {
        return None;
    }
    Some(HistoryRecord {
        name: name.to_string(),
        last_section: cell(row, 3).to_string(),
        usage_count: parse_usage_count(cell(row, 4)),
    })
}

/// Group data rows into lists, sections, and items.
///
/// Lists and sections are matched case-insensitively; the first occurrence
/// of a list or (list, section) pair fixes its position and spelling. Rows
/// without a list name or with fewer than four columns are ignored. A blank
/// section name becomes `default_section`.
#[must_use]
pub fn group_rows(records: &[Vec<String>], default_section: &str) -> DataBody {
    let mut body = DataBody::default();
    let mut list_index: HashMap<String, usize> = HashMap::new();
    let mut section_index: HashMap<(usize, String), usize> = HashMap::new();

    for (row_num, row) in records.iter().enumerate().skip(1) {
        if row.len() < MIN_ROW_COLUMNS {
            debug!(row = row_num + 1, "Skipping short CSV row");
            continue;
        }

        let list_name = cell(row, 0);
        if list_name.is_empty() {
            continue;
        }

        if list_name == RESERVED_LIST_NAME {
            if let Some(history) = history_from_row(row) {
                body.history.push(history);
            }
            continue;
        }

        let list_name = truncate_chars(list_name, MAX_LIST_NAME_LENGTH);
        let list_pos = *list_index
            .entry(list_name.to_lowercase())
            .or_insert_with(|| {
                body.lists.push(ListRecord {
                    name: list_name.clone(),
                    icon: row.get(1).cloned().unwrap_or_default(),
                    is_active: false,
                    sections: Vec::new(),
                });
                body.lists.len() - 1
            });

        let mut section_name = cell(row, 2);
        if section_name.is_empty() {
            section_name = default_section;
        }
        let section_name = truncate_chars(section_name, MAX_SECTION_NAME_LENGTH);
        let list = &mut body.lists[list_pos];
        let section_pos = *section_index
            .entry((list_pos, section_name.to_lowercase()))
            .or_insert_with(|| {
                list.sections.push(SectionRecord {
                    name: section_name.clone(),
                    items: Vec::new(),
                });
                list.sections.len() - 1
            });

        let item_name = cell(row, 3);
        if item_name.is_empty() {
            continue;
        }
        list.sections[section_pos].items.push(ItemRecord {
            name: item_name.to_string(),
            description: cell(row, 4).to_string(),
            completed: parse_bool(cell(row, 5)),
            uncertain: parse_bool(cell(row, 6)),
        });
    }

    body
}

/// Decode an uploaded CSV table into lists and history.
///
/// # Errors
///
/// Returns an error if the CSV is malformed or has no data rows.
pub fn decode(data: &[u8], delimiter: u8, default_section: &str) -> TransferResult<DataBody> {
    let records = read_records(data, delimiter)?;
    if records.len() < 2 {
        return Err(TransferError::Invalid("CSV file is empty".to_string()));
    }
    Ok(group_rows(&records, default_section))
}

/// Write `rows` under the fixed header, prefixed with a BOM.
///
/// # Errors
///
/// Returns an error if a row cannot be written.
pub fn encode<I, R>(rows: I, delimiter: u8) -> TransferResult<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| TransferError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}list_name,list_icon,section_name,item_name,item_description,item_completed,item_uncertain
Groceries,🛒,Dairy,Milk,2 liters,true,false
groceries,🥕,dairy,Butter,,FALSE,TRUE
Groceries,,,Bread,,,
Party,🎉,Drinks,,,,
[HISTORY],,Milk,Dairy,5,,
[HISTORY],,Eggs,,-3,,
,,Orphan,Row,,,
short,row
";

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom(b"\xEF\xBB\xBFabc"), b"abc");
        assert_eq!(strip_bom(b"abc"), b"abc");
    }

    #[test]
    fn test_group_rows() {
        let body = decode(SAMPLE.as_bytes(), b',', "General").unwrap();

        assert_eq!(body.lists.len(), 2);
        let groceries = &body.lists[0];
        assert_eq!(groceries.name, "Groceries");
        assert_eq!(groceries.icon, "🛒");
        assert_eq!(groceries.sections.len(), 2);
        assert_eq!(groceries.sections[0].name, "Dairy");
        assert_eq!(groceries.sections[0].items.len(), 2);
        assert!(groceries.sections[0].items[0].completed);
        assert!(groceries.sections[0].items[1].uncertain);
        assert_eq!(groceries.sections[1].name, "General");

        let party = &body.lists[1];
        assert_eq!(party.sections.len(), 1);
        assert!(party.sections[0].items.is_empty());

        assert_eq!(body.history.len(), 2);
        assert_eq!(body.history[0].usage_count, 5);
        assert_eq!(body.history[1].usage_count, 1);
        assert_eq!(body.history[1].last_section, "");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let data = "list_name;list_icon;section_name;item_name;item_description;item_completed;item_uncertain\nA;;S;Milk, whole;;;\n";
        let body = decode(data.as_bytes(), b';', "General").unwrap();
        assert_eq!(body.lists[0].sections[0].items[0].name, "Milk, whole");
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = decode(CSV_HEADER.join(",").as_bytes(), b',', "General").unwrap_err();
        assert_eq!(err.to_string(), "CSV file is empty");
    }

    #[test]
    fn test_encode_starts_with_bom_and_header() {
        let body = encode([["A", "🛒", "S", "Milk", "", "false", "false"]], b',').unwrap();
        assert!(body.starts_with(UTF8_BOM));
        let text = String::from_utf8(body[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("list_name,list_icon,section_name,item_name,item_description,item_completed,item_uncertain")
        );
        assert_eq!(lines.next(), Some("A,🛒,S,Milk,,false,false"));
    }

    #[test]
    fn test_parse_usage_count() {
        assert_eq!(parse_usage_count("7"), 7);
        assert_eq!(parse_usage_count("0"), 1);
        assert_eq!(parse_usage_count("many"), 1);
    }
}
