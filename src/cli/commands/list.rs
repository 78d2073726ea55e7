//! List command implementations.

use colored::Colorize;
use serde_json::{Value, json};

use super::{Context, field, request};
use crate::cli::ListCommands;
use crate::error::Result;
use crate::model::{List, Section};

/// Execute list commands.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the handler rejects
/// the request.
pub fn execute(command: &ListCommands, ctx: &Context<'_>) -> Result<()> {
    let mut api = ctx.open()?;

    match command {
        ListCommands::All => {
            let response = api.list_lists()?;
            ctx.emit(&response, |body: Value| {
                let lists: Vec<List> = field(&body, "lists").unwrap_or_default();
                print_lists(&lists);
            })
        }
        ListCommands::Show { id } => {
            let response = api.get_list(id)?;
            ctx.emit(&response, |body: Value| {
                let list: Option<List> = serde_json::from_value(body.clone()).ok();
                let sections: Vec<Section> = field(&body, "sections").unwrap_or_default();
                if let Some(list) = list {
                    print_detail(&list, &sections);
                }
            })
        }
        ListCommands::Create { name, icon } => {
            let body = request(&json!({ "name": name, "icon": icon }))?;
            let response = api.create_list(&body)?;
            ctx.emit(&response, |list: List| {
                println!("Created list: {} {} [{}]", list.icon, list.name, list.id);
            })
        }
        ListCommands::Update { id, name, icon } => {
            let body = request(&json!({ "name": name, "icon": icon }))?;
            let response = api.update_list(id, &body)?;
            ctx.emit(&response, |list: List| {
                println!("Updated list: {} {} [{}]", list.icon, list.name, list.id);
            })
        }
        ListCommands::Delete { id } => {
            api.delete_list(id)?;
            ctx.done(&format!("Deleted list: {id}"), json!({ "id": id, "deleted": true }))
        }
        ListCommands::Activate { id } => {
            let response = api.activate_list(id)?;
            ctx.emit(&response, |list: List| {
                println!("Active list: {} {}", list.icon, list.name.bold());
            })
        }
        ListCommands::Move { id, direction } => {
            let response = api.move_list(id, (*direction).into())?;
            ctx.emit(&response, |list: List| {
                println!("Moved list {} to position {}", list.name, list.sort_order + 1);
            })
        }
    }
}

fn print_lists(lists: &[List]) {
    if lists.is_empty() {
        println!("No lists yet. Create one with `koffan list create <name>`.");
        return;
    }

    for list in lists {
        let stats = list.stats.unwrap_or_default();
        let marker = if list.is_active { "*".green().bold() } else { " ".normal() };
        println!(
            "{marker} [{}] {} {}  {}",
            list.id,
            list.icon,
            list.name,
            format!(
                "{}/{} ({}%)",
                stats.completed_items,
                stats.total_items,
                stats.percent_complete()
            )
            .dimmed()
        );
    }
}

fn print_detail(list: &List, sections: &[Section]) {
    println!("{} {}", list.icon, list.name.cyan().bold());
    if sections.is_empty() {
        println!("  {}", "(no sections)".dimmed());
    }

    for section in sections {
        println!();
        println!("  {} {}", section.name.bold(), format!("[{}]", section.id).dimmed());
        for item in &section.items {
            let check = if item.completed { "[x]" } else { "[ ]" };
            let mut line = format!("    {check} {}", item.name);
            if item.uncertain {
                line.push_str(" ?");
            }
            if item.completed {
                println!("{} {}", line.dimmed(), format!("[{}]", item.id).dimmed());
            } else {
                println!("{line} {}", format!("[{}]", item.id).dimmed());
            }
            if !item.description.is_empty() {
                println!("        {}", item.description.dimmed());
            }
        }
    }
}
