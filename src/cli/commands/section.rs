//! Section command implementations.

use colored::Colorize;
use serde_json::{Value, json};

use super::{Context, field, request};
use crate::cli::SectionCommands;
use crate::error::Result;
use crate::model::{Item, Section};

/// Execute section commands. All of them require `--token`.
///
/// # Errors
///
/// Returns an error if authorization fails or the handler rejects the request.
pub fn execute(command: &SectionCommands, ctx: &Context<'_>) -> Result<()> {
    let mut api = ctx.open_gated()?;

    match command {
        SectionCommands::Show { id } => {
            let response = api.get_section(id)?;
            ctx.emit(&response, |section: Section| {
                println!("{} {}", section.name.bold(), format!("[{}]", section.id).dimmed());
                println!("  List:     {}", section.list_id);
                println!("  Position: {}", section.sort_order + 1);
                println!("  Items:    {}", section.items.len());
            })
        }
        SectionCommands::Create { list_id, name } => {
            let body = request(&json!({ "name": name, "list_id": list_id }))?;
            let response = api.create_section(&body)?;
            ctx.emit(&response, |section: Section| {
                println!("Created section: {} [{}]", section.name, section.id);
            })
        }
        SectionCommands::Update { id, name } => {
            let body = request(&json!({ "name": name }))?;
            let response = api.update_section(id, &body)?;
            ctx.emit(&response, |section: Section| {
                println!("Renamed section: {} [{}]", section.name, section.id);
            })
        }
        SectionCommands::Delete { id } => {
            api.delete_section(id)?;
            ctx.done(&format!("Deleted section: {id}"), json!({ "id": id, "deleted": true }))
        }
        SectionCommands::Items { id } => {
            let response = api.section_items(id)?;
            ctx.emit(&response, |body: Value| {
                let items: Vec<Item> = field(&body, "items").unwrap_or_default();
                if items.is_empty() {
                    println!("No items in this section.");
                }
                for item in &items {
                    let check = if item.completed { "[x]" } else { "[ ]" };
                    println!("{check} {} {}", item.name, format!("[{}]", item.id).dimmed());
                }
            })
        }
        SectionCommands::Move { id, direction } => {
            let response = api.move_section(id, (*direction).into())?;
            ctx.emit(&response, |section: Section| {
                println!("Moved section {} to position {}", section.name, section.sort_order + 1);
            })
        }
    }
}
