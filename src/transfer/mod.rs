//! Import and export of shopping data.
//!
//! - **Export**: lists (and optionally templates and history) to a versioned
//!   JSON envelope or a seven-column CSV table
//! - **Preview**: validate an upload and report counts and name conflicts
//!   without touching the store
//! - **Import**: write an upload in one transaction, resolving list name
//!   conflicts by skipping, replacing, or minting a copy name
//!
//! # Example
//!
//! ```ignore
//! use koffan::transfer::{Exporter, ExportOptions, Format, ImportOptions, Importer};
//!
//! let file = Exporter::new(&storage).export_all(&ExportOptions::default())?;
//! let stats = Importer::new(&mut other, ImportOptions::default())
//!     .import(&file.body, Format::Json)?;
//! ```

mod conflict;
mod csv_codec;
mod export;
mod file;
mod import;
mod preview;
mod types;

pub use conflict::{NameLookup, Resolution, find_unique_name, resolve};
pub use export::{Exporter, export_filename, sanitize_filename};
pub use file::{atomic_write, read_upload};
pub use import::Importer;
pub use preview::{preview, preview_csv, preview_json};
pub use types::{
    APP_NAME, CSV_HEADER, ConflictResolution, DataBody, EXPORT_VERSION, Envelope, ExportFile,
    ExportOptions, ExportPreview, Format, HISTORY_EXPORT_LIMIT, HISTORY_PREVIEW_LIMIT,
    HistoryRecord, ImportListInfo, ImportOptions, ImportPreview, ImportStats, ItemRecord,
    ListRecord, SectionRecord, TemplateItemRecord, TemplateRecord, TransferError, TransferResult,
    UTF8_BOM, parse_delimiter,
};
