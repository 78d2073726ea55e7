//! Template handlers.

use serde::Deserialize;

use super::{Api, ApiResponse, parse_body, parse_id};
use crate::broadcast::EventKind;
use crate::error::{Error, Result};
use crate::release::ReleaseSource;
use crate::validate::{
    MAX_DESCRIPTION_LENGTH, MAX_ITEM_NAME_LENGTH, MAX_SECTION_NAME_LENGTH,
    MAX_TEMPLATE_NAME_LENGTH, check_length, require_name,
};

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A blank `section_name` uses the localized default section.
#[derive(Debug, Deserialize)]
pub struct AddTemplateItemRequest {
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyTemplateRequest {
    #[serde(default)]
    pub list_id: i64,
}

impl<S: ReleaseSource> Api<S> {
    pub fn list_templates(&self) -> Result<ApiResponse> {
        let templates = self.storage.list_templates()?;
        ApiResponse::ok(serde_json::json!({ "templates": templates }))
    }

    pub fn get_template(&self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "template")?;
        let template = self
            .storage
            .get_template(id)?
            .ok_or(Error::TemplateNotFound { id })?;
        ApiResponse::ok(template)
    }

    pub fn create_template(&mut self, body: &[u8]) -> Result<ApiResponse> {
        let req: CreateTemplateRequest = parse_body(body)?;
        let name = req.name.trim();
        require_name(name, MAX_TEMPLATE_NAME_LENGTH)?;
        check_length("Description", &req.description, MAX_DESCRIPTION_LENGTH)?;

        let template = self.storage.create_template(name, &req.description)?;
        self.events.publish(EventKind::TemplateCreated, &template);
        ApiResponse::created(template)
    }

    pub fn delete_template(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "template")?;
        self.storage.delete_template(id)?;
        self.events.publish(EventKind::TemplateDeleted, serde_json::json!({ "id": id }));
        Ok(ApiResponse::no_content())
    }

    pub fn add_template_item(&mut self, id: &str, body: &[u8]) -> Result<ApiResponse> {
        let id = parse_id(id, "template")?;
        let req: AddTemplateItemRequest = parse_body(body)?;
        let name = req.name.trim();
        require_name(name, MAX_ITEM_NAME_LENGTH)?;
        check_length("Description", &req.description, MAX_DESCRIPTION_LENGTH)?;

        let section_name = match req.section_name.trim() {
            "" => crate::i18n::default_section_name(self.lang()),
            s => s.to_string(),
        };
        check_length("Section name", &section_name, MAX_SECTION_NAME_LENGTH)?;

        let item = self
            .storage
            .add_template_item(id, &section_name, name, &req.description)?;
        self.events.publish(EventKind::TemplateUpdated, &item);
        ApiResponse::created(item)
    }

    /// Copy a template's items into a list. Returns `{added}`.
    pub fn apply_template(&mut self, id: &str, body: &[u8]) -> Result<ApiResponse> {
        let id = parse_id(id, "template")?;
        let req: ApplyTemplateRequest = parse_body(body)?;
        if req.list_id == 0 {
            return Err(Error::Validation("list_id is required".to_string()));
        }

        let added = self.storage.apply_template(id, req.list_id)?;
        self.events.publish(
            EventKind::TemplateApplied,
            serde_json::json!({ "template_id": id, "list_id": req.list_id }),
        );
        ApiResponse::ok(serde_json::json!({ "added": added }))
    }
}
