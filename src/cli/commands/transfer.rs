//! Export and import command implementations.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::Context;
use crate::api::{Body, ExportQuery, ImportForm, Upload};
use crate::cli::{ExportArgs, ExportFormat, ImportArgs, Resolution};
use crate::error::{Error, Result};
use crate::transfer::{TransferError, atomic_write, read_upload};

#[derive(Serialize)]
struct ExportOutput {
    path: PathBuf,
    bytes: usize,
}

impl ExportFormat {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl Resolution {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Replace => "replace",
            Self::Copy => "copy",
        }
    }
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the list does not exist or the file cannot be written.
pub fn export(args: &ExportArgs, ctx: &Context<'_>) -> Result<()> {
    let api = ctx.open()?;

    if args.preview {
        let response = api.export_preview()?;
        return ctx.emit(&response, |body: Value| {
            println!("{}", "Export would contain".cyan().bold());
            println!("  Lists:     {}", body["lists_count"]);
            println!("  Items:     {}", body["items_count"]);
            println!("  Templates: {}", body["templates_count"]);
            println!("  History:   {}", body["history_count"]);
        });
    }

    let flag = |excluded: bool| excluded.then(|| "false".to_string());
    let query = ExportQuery {
        format: Some(args.format.as_str().to_string()),
        include_templates: flag(args.no_templates),
        include_history: flag(args.no_history),
        delimiter: Some(args.delimiter.clone()),
    };

    let response = match &args.list {
        Some(id) => api.export_list(id, &query)?,
        None => api.export_all(&query)?,
    };
    let Body::File(file) = response.body else {
        return Err(Error::Other("Export produced no file".to_string()));
    };

    let path = output_path(args.output.as_deref(), &file.filename);
    atomic_write(&path, &file.body)?;

    if ctx.json {
        let output = ExportOutput {
            path,
            bytes: file.body.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !ctx.quiet {
        println!("Exported to {}", path.display());
    }
    Ok(())
}

/// Where an export lands: a directory gets the generated file name.
fn output_path(output: Option<&Path>, filename: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(filename),
    }
}

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the file is unreadable, too large, or not a valid
/// Koffan export.
pub fn import(args: &ImportArgs, ctx: &Context<'_>) -> Result<()> {
    let mut api = ctx.open()?;
    let data = read_upload(&args.file, api.config().max_import_bytes)?;
    let upload = Upload {
        filename: args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        data,
    };

    if args.preview {
        let response = api.preview_import(&upload, Some(&args.delimiter))?;
        if !response.is_success() {
            let message = response
                .json_body()
                .and_then(|body| body["error"].as_str())
                .unwrap_or("Invalid import file")
                .to_string();
            return Err(TransferError::Invalid(message).into());
        }
        return ctx.emit(&response, |body: Value| print_preview(&body));
    }

    let form = ImportForm {
        conflict_resolution: Some(args.resolution.as_str().to_string()),
        copy_suffix: Some(args.copy_suffix.clone()),
        delimiter: Some(args.delimiter.clone()),
    };
    let response = api.import(&upload, &form)?;
    ctx.emit(&response, |body: Value| {
        println!("{}", "Import complete".green().bold());
        println!("  Lists:     {}", body["imported_lists"]);
        println!("  Items:     {}", body["imported_items"]);
        println!("  Templates: {}", body["imported_templates"]);
        println!("  History:   {}", body["imported_history"]);
        if body["skipped_lists"].as_u64().unwrap_or(0) > 0 {
            println!("  Skipped:   {}", body["skipped_lists"]);
        }
        if body["skipped_items"].as_u64().unwrap_or(0) > 0 {
            println!("  Unnamed:   {} items skipped", body["skipped_items"]);
        }
    })
}

fn print_preview(body: &Value) {
    println!(
        "{} ({})",
        "Import preview".cyan().bold(),
        body["format"].as_str().unwrap_or_default()
    );
    println!("  Lists:     {}", body["lists_count"]);
    println!("  Items:     {}", body["items_count"]);
    println!("  Templates: {}", body["templates_count"]);
    println!("  History:   {}", body["history_count"]);

    let lists = body["lists"].as_array().map(Vec::as_slice).unwrap_or_default();
    for list in lists {
        let line = format!(
            "  {} {} ({} sections, {} items)",
            list["icon"].as_str().unwrap_or_default(),
            list["name"].as_str().unwrap_or_default(),
            list["sections"],
            list["items"]
        );
        if list["has_conflict"].as_bool().unwrap_or(false) {
            println!("{} {}", line.yellow(), "exists".yellow().bold());
        } else {
            println!("{line}");
        }
    }
}
