//! Item command implementations.

use colored::Colorize;
use serde_json::json;

use super::{Context, format_time, request};
use crate::cli::ItemCommands;
use crate::error::Result;
use crate::model::Item;

/// Execute item commands. All of them require `--token`.
///
/// # Errors
///
/// Returns an error if authorization fails or the handler rejects the request.
pub fn execute(command: &ItemCommands, ctx: &Context<'_>) -> Result<()> {
    let mut api = ctx.open_gated()?;

    match command {
        ItemCommands::Show { id } => {
            let response = api.get_item(id)?;
            ctx.emit(&response, print_item)
        }
        ItemCommands::Add {
            section_id,
            name,
            description,
        } => {
            let body = request(&json!({
                "name": name,
                "section_id": section_id,
                "description": description,
            }))?;
            let response = api.create_item(&body)?;
            ctx.emit(&response, |item: Item| {
                println!("Added item: {} [{}]", item.name, item.id);
            })
        }
        ItemCommands::Update {
            id,
            name,
            description,
        } => {
            let body = request(&json!({ "name": name, "description": description }))?;
            let response = api.update_item(id, &body)?;
            ctx.emit(&response, |item: Item| {
                println!("Updated item: {} [{}]", item.name, item.id);
            })
        }
        ItemCommands::Delete { id } => {
            api.delete_item(id)?;
            ctx.done(&format!("Deleted item: {id}"), json!({ "id": id, "deleted": true }))
        }
        ItemCommands::Toggle { id } => {
            let response = api.toggle_item(id)?;
            ctx.emit(&response, |item: Item| {
                let state = if item.completed { "done".green() } else { "open".yellow() };
                println!("{}: {state}", item.name);
            })
        }
        ItemCommands::Uncertain { id } => {
            let response = api.toggle_item_uncertain(id)?;
            ctx.emit(&response, |item: Item| {
                let state = if item.uncertain { "uncertain" } else { "certain" };
                println!("{}: {state}", item.name);
            })
        }
        ItemCommands::Transfer { id, section_id } => {
            let body = request(&json!({ "section_id": section_id }))?;
            let response = api.move_item_to_section(id, &body)?;
            ctx.emit(&response, |item: Item| {
                println!("Moved {} to section {}", item.name, item.section_id);
            })
        }
        ItemCommands::Move { id, direction } => {
            let response = api.move_item(id, (*direction).into())?;
            ctx.emit(&response, |item: Item| {
                println!("Moved {} to position {}", item.name, item.sort_order + 1);
            })
        }
    }
}

fn print_item(item: Item) {
    println!("{} {}", item.name.bold(), format!("[{}]", item.id).dimmed());
    if !item.description.is_empty() {
        println!("  {}", item.description);
    }
    println!("  Section:   {}", item.section_id);
    println!("  Completed: {}", if item.completed { "yes" } else { "no" });
    println!("  Uncertain: {}", if item.uncertain { "yes" } else { "no" });
    println!("  Updated:   {}", format_time(item.updated_at));
}
