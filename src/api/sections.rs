//! Section handlers.

use serde::Deserialize;

use super::{Api, ApiResponse, parse_body, parse_id};
use crate::broadcast::EventKind;
use crate::error::{Error, Result};
use crate::release::ReleaseSource;
use crate::storage::MoveDirection;
use crate::validate::{MAX_SECTION_NAME_LENGTH, check_length};

#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub list_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSectionRequest {
    #[serde(default)]
    pub name: String,
}

fn require_section_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("Name is required".to_string()));
    }
    Ok(())
}

impl<S: ReleaseSource> Api<S> {
    pub fn get_section(&self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "section")?;
        let section = self
            .storage
            .get_section(id)?
            .ok_or(Error::SectionNotFound { id })?;
        ApiResponse::ok(section)
    }

    pub fn create_section(&mut self, body: &[u8]) -> Result<ApiResponse> {
        let req: CreateSectionRequest = parse_body(body)?;
        let name = req.name.trim();
        require_section_name(name)?;
        if req.list_id == 0 {
            return Err(Error::Validation("list_id is required".to_string()));
        }
        check_length("Name", name, MAX_SECTION_NAME_LENGTH)?;

        let section = self.storage.create_section(req.list_id, name)?;
        self.events.publish(EventKind::SectionCreated, &section);
        ApiResponse::created(section)
    }

    pub fn update_section(&mut self, id: &str, body: &[u8]) -> Result<ApiResponse> {
        let id = parse_id(id, "section")?;
        let req: UpdateSectionRequest = parse_body(body)?;
        let name = req.name.trim();
        require_section_name(name)?;
        check_length("Name", name, MAX_SECTION_NAME_LENGTH)?;

        let section = self.storage.update_section(id, name)?;
        self.events.publish(EventKind::SectionUpdated, &section);
        ApiResponse::ok(section)
    }

    pub fn delete_section(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "section")?;
        self.storage.delete_section(id)?;
        self.events.publish(EventKind::SectionDeleted, serde_json::json!({ "id": id }));
        Ok(ApiResponse::no_content())
    }

    /// Items of a section as `{items}`.
    pub fn section_items(&self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "section")?;
        if self.storage.get_section(id)?.is_none() {
            return Err(Error::SectionNotFound { id });
        }
        let items = self.storage.section_items(id)?;
        ApiResponse::ok(serde_json::json!({ "items": items }))
    }

    /// Swap a section with its neighbour; the section is returned either way.
    pub fn move_section(&mut self, id: &str, direction: MoveDirection) -> Result<ApiResponse> {
        let id = parse_id(id, "section")?;
        self.storage.move_section(id, direction)?;
        self.events.notify(EventKind::SectionsReordered);
        let section = self
            .storage
            .get_section(id)?
            .ok_or(Error::SectionNotFound { id })?;
        ApiResponse::ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{NoRelease, api, body, json};
    use super::*;

    fn with_list() -> (Api<NoRelease>, i64) {
        let mut api = api();
        let list = api.create_list(&body(serde_json::json!({"name": "Groceries"}))).unwrap();
        let id = json(&list)["id"].as_i64().unwrap();
        (api, id)
    }

    #[test]
    fn test_create_section_validation_order() {
        let (mut api, list_id) = with_list();

        let err = api
            .create_section(&body(serde_json::json!({"list_id": list_id})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Name is required");

        let err = api
            .create_section(&body(serde_json::json!({"name": "Dairy"})))
            .unwrap_err();
        assert_eq!(err.to_string(), "list_id is required");

        let err = api
            .create_section(&body(serde_json::json!({"name": "Dairy", "list_id": 999})))
            .unwrap_err();
        assert_eq!(err.to_api_json()["message"], "List not found");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn test_section_lifecycle() {
        let (mut api, list_id) = with_list();
        let mut rx = api.events().subscribe();

        let created = api
            .create_section(&body(serde_json::json!({"name": "Dairy", "list_id": list_id})))
            .unwrap();
        assert_eq!(created.status, 201);
        let id = json(&created)["id"].to_string();

        let updated = api
            .update_section(&id, &body(serde_json::json!({"name": "Fridge"})))
            .unwrap();
        assert_eq!(json(&updated)["name"], "Fridge");

        let items = api.section_items(&id).unwrap();
        assert_eq!(json(&items)["items"], serde_json::json!([]));

        assert_eq!(api.delete_section(&id).unwrap().status, 204);
        assert_eq!(api.get_section(&id).unwrap_err().http_status(), 404);

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::SectionCreated, EventKind::SectionUpdated, EventKind::SectionDeleted]
        );
    }

    #[test]
    fn test_move_section_returns_section() {
        let (mut api, list_id) = with_list();
        api.create_section(&body(serde_json::json!({"name": "A", "list_id": list_id})))
            .unwrap();
        let second = api
            .create_section(&body(serde_json::json!({"name": "B", "list_id": list_id})))
            .unwrap();
        let id = json(&second)["id"].to_string();

        let moved = api.move_section(&id, MoveDirection::Up).unwrap();
        assert_eq!(json(&moved)["sort_order"], 0);

        // Already first: nothing changes, still 200.
        let moved = api.move_section(&id, MoveDirection::Up).unwrap();
        assert_eq!(moved.status, 200);
        assert_eq!(json(&moved)["sort_order"], 0);
    }
}
