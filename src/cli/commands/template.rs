//! Template command implementations.

use colored::Colorize;
use serde_json::{Value, json};

use super::{Context, field, request};
use crate::cli::TemplateCommands;
use crate::error::Result;
use crate::model::{Template, TemplateItem};

/// Execute template commands.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the handler rejects
/// the request.
pub fn execute(command: &TemplateCommands, ctx: &Context<'_>) -> Result<()> {
    let mut api = ctx.open()?;

    match command {
        TemplateCommands::All => {
            let response = api.list_templates()?;
            ctx.emit(&response, |body: Value| {
                let templates: Vec<Template> = field(&body, "templates").unwrap_or_default();
                if templates.is_empty() {
                    println!("No templates yet.");
                }
                for template in &templates {
                    println!(
                        "[{}] {} {}",
                        template.id,
                        template.name,
                        format!("({} items)", template.items.len()).dimmed()
                    );
                }
            })
        }
        TemplateCommands::Show { id } => {
            let response = api.get_template(id)?;
            ctx.emit(&response, |template: Template| print_template(&template))
        }
        TemplateCommands::Create { name, description } => {
            let body = request(&json!({ "name": name, "description": description }))?;
            let response = api.create_template(&body)?;
            ctx.emit(&response, |template: Template| {
                println!("Created template: {} [{}]", template.name, template.id);
            })
        }
        TemplateCommands::Delete { id } => {
            api.delete_template(id)?;
            ctx.done(&format!("Deleted template: {id}"), json!({ "id": id, "deleted": true }))
        }
        TemplateCommands::AddItem {
            id,
            name,
            section,
            description,
        } => {
            let body = request(&json!({
                "section_name": section,
                "name": name,
                "description": description,
            }))?;
            let response = api.add_template_item(id, &body)?;
            ctx.emit(&response, |item: TemplateItem| {
                println!("Added {} under {}", item.name, item.section_name);
            })
        }
        TemplateCommands::Apply { id, list_id } => {
            let body = request(&json!({ "list_id": list_id }))?;
            let response = api.apply_template(id, &body)?;
            ctx.emit(&response, |body: Value| {
                let added: usize = field(&body, "added").unwrap_or_default();
                println!("Added {added} items to list {list_id}");
            })
        }
    }
}

fn print_template(template: &Template) {
    println!("{} {}", template.name.cyan().bold(), format!("[{}]", template.id).dimmed());
    if !template.description.is_empty() {
        println!("  {}", template.description);
    }

    let mut current_section: Option<&str> = None;
    for item in &template.items {
        if current_section != Some(item.section_name.as_str()) {
            println!("  {}", item.section_name.bold());
            current_section = Some(item.section_name.as_str());
        }
        println!("    - {}", item.name);
    }
}
