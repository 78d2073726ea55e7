//! History command implementations.

use colored::Colorize;
use serde_json::{Value, json};

use super::{Context, field, format_time, request};
use crate::cli::HistoryCommands;
use crate::error::Result;
use crate::model::HistoryEntry;

/// Execute history commands. All of them require `--token`.
///
/// # Errors
///
/// Returns an error if authorization fails or the handler rejects the request.
pub fn execute(command: &HistoryCommands, ctx: &Context<'_>) -> Result<()> {
    let mut api = ctx.open_gated()?;

    match command {
        HistoryCommands::All => {
            let response = api.list_history()?;
            ctx.emit(&response, |body: Value| {
                let entries: Vec<HistoryEntry> = field(&body, "items").unwrap_or_default();
                if entries.is_empty() {
                    println!("History is empty.");
                }
                for entry in &entries {
                    let section = entry.last_section_name.as_deref().unwrap_or("-");
                    println!(
                        "[{}] {} {} {}",
                        entry.id,
                        entry.name,
                        format!("x{} in {section}", entry.usage_count).dimmed(),
                        format_time(entry.last_used_at).dimmed()
                    );
                }
            })
        }
        HistoryCommands::Add { name, section } => {
            let body = request(&json!({ "name": name, "section_id": section }))?;
            let response = api.create_history(&body)?;
            ctx.emit(&response, |body: Value| {
                println!("Recorded: {}", body["name"].as_str().unwrap_or_default());
            })
        }
        HistoryCommands::Delete { id } => {
            api.delete_history(id)?;
            ctx.done(
                &format!("Deleted history entry: {id}"),
                json!({ "id": id, "deleted": true }),
            )
        }
        HistoryCommands::Prune { ids } => {
            let body = request(&json!({ "ids": ids }))?;
            let response = api.delete_history_batch(&body)?;
            ctx.emit(&response, |body: Value| {
                let deleted: usize = field(&body, "deleted").unwrap_or_default();
                println!("Deleted {deleted} history entries");
            })
        }
    }
}
