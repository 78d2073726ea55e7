//! Item handlers.

use serde::Deserialize;

use super::{Api, ApiResponse, parse_body, parse_id};
use crate::broadcast::EventKind;
use crate::error::{Error, Result};
use crate::release::ReleaseSource;
use crate::storage::MoveDirection;
use crate::validate::{MAX_DESCRIPTION_LENGTH, MAX_ITEM_NAME_LENGTH, check_length};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub section_id: i64,
    #[serde(default)]
    pub description: String,
}

/// Empty fields fall back to the stored values; see [`Api::update_item`].
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    #[serde(default)]
    pub section_id: i64,
}

fn check_item_fields(name: &str, description: &str) -> Result<()> {
    check_length("Name", name, MAX_ITEM_NAME_LENGTH)?;
    check_length("Description", description, MAX_DESCRIPTION_LENGTH)
}

impl<S: ReleaseSource> Api<S> {
    pub fn get_item(&self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "item")?;
        let item = self.storage.get_item(id)?.ok_or(Error::ItemNotFound { id })?;
        ApiResponse::ok(item)
    }

    /// Create an item at the end of its section. The name is also recorded in history.
    pub fn create_item(&mut self, body: &[u8]) -> Result<ApiResponse> {
        let req: CreateItemRequest = parse_body(body)?;
        let name = req.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Name is required".to_string()));
        }
        if req.section_id == 0 {
            return Err(Error::Validation("section_id is required".to_string()));
        }
        check_item_fields(name, &req.description)?;

        let item = self.storage.create_item(req.section_id, name, &req.description)?;
        self.events.publish(EventKind::ItemCreated, &item);
        ApiResponse::created(item)
    }

    /// Update name and description.
    ///
    /// An empty name keeps the stored one. An empty description keeps the
    /// stored one only when a new name is given; otherwise it clears it.
    pub fn update_item(&mut self, id: &str, body: &[u8]) -> Result<ApiResponse> {
        let id = parse_id(id, "item")?;
        let req: UpdateItemRequest = parse_body(body)?;
        let existing = self.storage.get_item(id)?.ok_or(Error::ItemNotFound { id })?;

        let new_name = req.name.trim();
        let name = if new_name.is_empty() { existing.name.as_str() } else { new_name };
        let description = if req.description.is_empty() && !new_name.is_empty() {
            existing.description.as_str()
        } else {
            req.description.as_str()
        };
        check_item_fields(name, description)?;

        let item = self.storage.update_item(id, name, description)?;
        self.events.publish(EventKind::ItemUpdated, &item);
        ApiResponse::ok(item)
    }

    pub fn delete_item(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "item")?;
        self.storage.delete_item(id)?;
        self.events.publish(EventKind::ItemDeleted, serde_json::json!({ "id": id }));
        Ok(ApiResponse::no_content())
    }

    pub fn toggle_item(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "item")?;
        let item = self.storage.toggle_item_completed(id)?;
        self.events.publish(EventKind::ItemToggled, &item);
        ApiResponse::ok(item)
    }

    pub fn toggle_item_uncertain(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "item")?;
        let item = self.storage.toggle_item_uncertain(id)?;
        self.events.publish(EventKind::ItemUpdated, &item);
        ApiResponse::ok(item)
    }

    /// Move an item to the end of another section.
    pub fn move_item_to_section(&mut self, id: &str, body: &[u8]) -> Result<ApiResponse> {
        let id = parse_id(id, "item")?;
        let req: MoveItemRequest = parse_body(body)?;
        if req.section_id == 0 {
            return Err(Error::Validation("section_id is required".to_string()));
        }

        let item = self.storage.move_item_to_section(id, req.section_id)?;
        self.events.publish(EventKind::ItemMoved, &item);
        ApiResponse::ok(item)
    }

    pub fn move_item(&mut self, id: &str, direction: MoveDirection) -> Result<ApiResponse> {
        let id = parse_id(id, "item")?;
        self.storage.move_item(id, direction)?;
        let item = self.storage.get_item(id)?.ok_or(Error::ItemNotFound { id })?;
        self.events.publish(
            EventKind::ItemsReordered,
            serde_json::json!({ "section_id": item.section_id }),
        );
        ApiResponse::ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{NoRelease, api, body, json};
    use super::*;

    fn with_section() -> (Api<NoRelease>, i64) {
        let mut api = api();
        let list = api.create_list(&body(serde_json::json!({"name": "Groceries"}))).unwrap();
        let list_id = json(&list)["id"].as_i64().unwrap();
        let section = api
            .create_section(&body(serde_json::json!({"name": "Dairy", "list_id": list_id})))
            .unwrap();
        let id = json(&section)["id"].as_i64().unwrap();
        (api, id)
    }

    fn create(api: &mut Api<NoRelease>, section_id: i64, name: &str, description: &str) -> String {
        let response = api
            .create_item(&body(serde_json::json!({
                "name": name,
                "section_id": section_id,
                "description": description,
            })))
            .unwrap();
        assert_eq!(response.status, 201);
        json(&response)["id"].to_string()
    }

    #[test]
    fn test_create_item_validation() {
        let (mut api, section_id) = with_section();

        let err = api.create_item(&body(serde_json::json!({"name": "Milk"}))).unwrap_err();
        assert_eq!(err.to_string(), "section_id is required");

        let err = api
            .create_item(&body(serde_json::json!({
                "name": "Milk",
                "section_id": section_id,
                "description": "d".repeat(501),
            })))
            .unwrap_err();
        assert_eq!(err.to_string(), "Description exceeds maximum length of 500 characters");

        let err = api
            .create_item(&body(serde_json::json!({"name": "Milk", "section_id": 999})))
            .unwrap_err();
        assert_eq!(err.to_api_json()["message"], "Section not found");
    }

    #[test]
    fn test_create_records_history() {
        let (mut api, section_id) = with_section();
        create(&mut api, section_id, "Milk", "");
        let history = api.list_history().unwrap();
        assert_eq!(json(&history)["items"][0]["name"], "Milk");
    }

    #[test]
    fn test_update_item_field_fallbacks() {
        let (mut api, section_id) = with_section();
        let id = create(&mut api, section_id, "Milk", "2 liters");

        let updated = api
            .update_item(&id, &body(serde_json::json!({"name": "Oat milk"})))
            .unwrap();
        assert_eq!(json(&updated)["name"], "Oat milk");
        assert_eq!(json(&updated)["description"], "2 liters");

        let updated = api
            .update_item(&id, &body(serde_json::json!({"description": "1 liter"})))
            .unwrap();
        assert_eq!(json(&updated)["name"], "Oat milk");
        assert_eq!(json(&updated)["description"], "1 liter");

        let updated = api.update_item(&id, &body(serde_json::json!({}))).unwrap();
        assert_eq!(json(&updated)["name"], "Oat milk");
        assert_eq!(json(&updated)["description"], "");
    }

    #[test]
    fn test_toggles() {
        let (mut api, section_id) = with_section();
        let id = create(&mut api, section_id, "Milk", "");

        let toggled = api.toggle_item(&id).unwrap();
        assert_eq!(json(&toggled)["completed"], true);
        let toggled = api.toggle_item_uncertain(&id).unwrap();
        assert_eq!(json(&toggled)["uncertain"], true);
        assert_eq!(json(&toggled)["completed"], true);
    }

    #[test]
    fn test_move_to_section() {
        let (mut api, section_id) = with_section();
        let id = create(&mut api, section_id, "Milk", "");
        let list_id = api.storage().get_section(section_id).unwrap().unwrap().list_id;
        let target = api
            .create_section(&body(serde_json::json!({"name": "Fridge", "list_id": list_id})))
            .unwrap();
        let target_id = json(&target)["id"].as_i64().unwrap();

        let err = api
            .move_item_to_section(&id, &body(serde_json::json!({"section_id": 999})))
            .unwrap_err();
        assert_eq!(err.to_api_json()["message"], "Target section not found");

        let moved = api
            .move_item_to_section(&id, &body(serde_json::json!({"section_id": target_id})))
            .unwrap();
        assert_eq!(json(&moved)["section_id"], target_id);
    }

    #[test]
    fn test_move_item_broadcasts_section() {
        let (mut api, section_id) = with_section();
        create(&mut api, section_id, "Milk", "");
        let second = create(&mut api, section_id, "Butter", "");
        let mut rx = api.events().subscribe();

        let moved = api.move_item(&second, MoveDirection::Up).unwrap();
        assert_eq!(json(&moved)["sort_order"], 0);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::ItemsReordered);
        assert_eq!(event.data["section_id"], section_id);
    }
}
