//! Export and import handlers.

use tracing::info;

use super::{Api, ApiResponse, parse_id};
use crate::broadcast::EventKind;
use crate::error::{Error, Result};
use crate::release::ReleaseSource;
use crate::transfer::{
    ConflictResolution, ExportOptions, Exporter, Format, ImportOptions, ImportPreview, Importer,
    NameLookup, TransferError, parse_delimiter, preview,
};

/// An uploaded file.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Import form fields; missing values take their defaults.
#[derive(Debug, Clone, Default)]
pub struct ImportForm {
    pub conflict_resolution: Option<String>,
    pub copy_suffix: Option<String>,
    pub delimiter: Option<String>,
}

/// Export query parameters; missing values take their defaults.
#[derive(Debug, Clone, Default)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub include_templates: Option<String>,
    pub include_history: Option<String>,
    pub delimiter: Option<String>,
}

impl ExportQuery {
    /// Flags default to true; only the literal `true` keeps them on when given.
    fn options(&self) -> ExportOptions {
        let flag = |value: &Option<String>| value.as_deref().is_none_or(|v| v == "true");
        ExportOptions {
            format: Format::from_param(self.format.as_deref().unwrap_or("json")),
            include_templates: flag(&self.include_templates),
            include_history: flag(&self.include_history),
            delimiter: parse_delimiter(self.delimiter.as_deref().unwrap_or(",")),
        }
    }
}

impl<S: ReleaseSource> Api<S> {
    /// Export every list as a download.
    pub fn export_all(&self, query: &ExportQuery) -> Result<ApiResponse> {
        let file = Exporter::new(&self.storage).export_all(&query.options())?;
        Ok(ApiResponse::file(file))
    }

    /// Export one list as a download.
    pub fn export_list(&self, id: &str, query: &ExportQuery) -> Result<ApiResponse> {
        let id = parse_id(id, "list")?;
        let options = query.options();
        let file = Exporter::new(&self.storage)
            .export_list(id, options.format, options.delimiter)?
            .ok_or(Error::ListNotFound { id })?;
        Ok(ApiResponse::file(file))
    }

    /// Counts of what a full export would contain.
    pub fn export_preview(&self) -> Result<ApiResponse> {
        let preview = Exporter::new(&self.storage).preview()?;
        ApiResponse::ok(preview)
    }

    /// Validate an upload without importing it.
    ///
    /// Answers 200 with the preview when valid, 400 with `valid: false` and
    /// an `error` message otherwise.
    pub fn preview_import(&self, upload: &Upload, delimiter: Option<&str>) -> Result<ApiResponse> {
        let format = Format::detect(&upload.filename, &upload.data);
        let preview = if upload.data.len() > self.config.max_import_bytes {
            ImportPreview::invalid(
                format,
                TransferError::TooLarge { max: self.config.max_import_bytes }.to_string(),
            )
        } else {
            let existing = self.existing_names()?;
            preview(
                &upload.data,
                format,
                parse_delimiter(delimiter.unwrap_or(",")),
                &existing,
                self.lang(),
            )
        };

        let status = if preview.valid { 200 } else { 400 };
        ApiResponse::json(status, preview)
    }

    /// Import an upload in one transaction.
    pub fn import(&mut self, upload: &Upload, form: &ImportForm) -> Result<ApiResponse> {
        if upload.data.len() > self.config.max_import_bytes {
            return Err(TransferError::TooLarge { max: self.config.max_import_bytes }.into());
        }

        let options = ImportOptions {
            resolution: ConflictResolution::sanitize(
                form.conflict_resolution.as_deref().unwrap_or("skip"),
            ),
            copy_suffix: form
                .copy_suffix
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("copy")
                .to_string(),
            delimiter: parse_delimiter(form.delimiter.as_deref().unwrap_or(",")),
            lang: self.lang().to_string(),
        };

        let format = Format::detect(&upload.filename, &upload.data);
        info!(
            file = %upload.filename,
            format = format.as_str(),
            resolution = options.resolution.as_str(),
            "Importing upload"
        );
        let stats = Importer::new(&mut self.storage, options).import(&upload.data, format)?;
        self.events.publish(EventKind::DataImported, &stats);

        let mut body = serde_json::to_value(&stats)?;
        body["success"] = serde_json::Value::Bool(true);
        ApiResponse::ok(body)
    }

    fn existing_names(&self) -> Result<NameLookup> {
        let lists = self.storage.list_lists()?;
        Ok(NameLookup::from_existing(
            lists.iter().map(|l| (l.name.as_str(), l.id)),
        ))
    }
}
