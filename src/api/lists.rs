//! List handlers.

use serde::{Deserialize, Serialize};

use super::{Api, ApiResponse, parse_body, parse_id};
use crate::broadcast::EventKind;
use crate::error::{Error, Result};
use crate::model::{List, Section};
use crate::release::ReleaseSource;
use crate::storage::MoveDirection;
use crate::validate::{normalize_icon, validate_list_name};

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

/// A missing icon keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Serialize)]
struct ListDetail {
    #[serde(flatten)]
    list: List,
    sections: Vec<Section>,
}

impl<S: ReleaseSource> Api<S> {
    /// All lists with completion stats.
    pub fn list_lists(&self) -> Result<ApiResponse> {
        let lists = self.storage.list_lists()?;
        ApiResponse::ok(serde_json::json!({ "lists": lists }))
    }

    /// One list with its sections and items.
    pub fn get_list(&self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "list")?;
        let list = self.storage.get_list(id)?.ok_or(Error::ListNotFound { id })?;
        let sections = self.storage.list_sections_with_items(id)?;
        ApiResponse::ok(ListDetail { list, sections })
    }

    pub fn create_list(&mut self, body: &[u8]) -> Result<ApiResponse> {
        let req: CreateListRequest = parse_body(body)?;
        let name = req.name.trim();
        validate_list_name(name, self.lang())?;

        let list = self.storage.create_list(name, &normalize_icon(req.icon.trim()))?;
        self.events.publish(EventKind::ListCreated, &list);
        ApiResponse::created(list)
    }

    pub fn update_list(&mut self, id: &str, body: &[u8]) -> Result<ApiResponse> {
        let id = parse_id(id, "list")?;
        let req: UpdateListRequest = parse_body(body)?;
        let name = req.name.trim();
        validate_list_name(name, self.lang())?;

        let existing = self.storage.get_list(id)?.ok_or(Error::ListNotFound { id })?;
        let icon = req
            .icon
            .as_deref()
            .map_or(existing.icon, |icon| normalize_icon(icon.trim()));

        let list = self.storage.update_list(id, name, &icon)?;
        self.events.publish(EventKind::ListUpdated, &list);
        ApiResponse::ok(list)
    }

    pub fn delete_list(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "list")?;
        self.storage.delete_list(id)?;
        self.events.publish(EventKind::ListDeleted, serde_json::json!({ "id": id }));
        Ok(ApiResponse::no_content())
    }

    /// Make a list the active one.
    pub fn activate_list(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "list")?;
        let list = self.storage.set_active_list(id)?;
        self.events.publish(EventKind::ListActivated, &list);
        ApiResponse::ok(list)
    }

    pub fn move_list(&mut self, id: &str, direction: MoveDirection) -> Result<ApiResponse> {
        let id = parse_id(id, "list")?;
        self.storage.move_list(id, direction)?;
        self.events.notify(EventKind::ListsReordered);
        let list = self.storage.get_list(id)?.ok_or(Error::ListNotFound { id })?;
        ApiResponse::ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{api, body, json};
    use super::*;

    #[test]
    fn test_create_and_get_list() {
        let mut api = api();
        let mut rx = api.events().subscribe();

        let created = api
            .create_list(&body(serde_json::json!({"name": " Groceries ", "icon": ""})))
            .unwrap();
        assert_eq!(created.status, 201);
        assert_eq!(json(&created)["name"], "Groceries");
        assert_eq!(json(&created)["icon"], "🛒");
        assert_eq!(json(&created)["is_active"], true);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ListCreated);

        let id = json(&created)["id"].to_string();
        let fetched = api.get_list(&id).unwrap();
        assert_eq!(json(&fetched)["sections"], serde_json::json!([]));
        assert_eq!(json(&fetched)["stats"]["total_items"], 0);
    }

    #[test]
    fn test_create_list_validation() {
        let mut api = api();
        let err = api.create_list(&body(serde_json::json!({"name": ""}))).unwrap_err();
        assert_eq!(err.to_string(), "Name is required");

        let err = api
            .create_list(&body(serde_json::json!({"name": "[HISTORY]"})))
            .unwrap_err();
        assert_eq!(err.http_status(), 400);

        let long = "n".repeat(101);
        let err = api.create_list(&body(serde_json::json!({"name": long}))).unwrap_err();
        assert_eq!(err.to_string(), "Name exceeds maximum length of 100 characters");
    }

    #[test]
    fn test_update_keeps_icon_when_missing() {
        let mut api = api();
        let created = api
            .create_list(&body(serde_json::json!({"name": "Party", "icon": "🎉"})))
            .unwrap();
        let id = json(&created)["id"].to_string();

        let updated = api
            .update_list(&id, &body(serde_json::json!({"name": "Birthday"})))
            .unwrap();
        assert_eq!(json(&updated)["name"], "Birthday");
        assert_eq!(json(&updated)["icon"], "🎉");
    }

    #[test]
    fn test_delete_and_missing() {
        let mut api = api();
        let created = api.create_list(&body(serde_json::json!({"name": "A"}))).unwrap();
        let id = json(&created)["id"].to_string();

        assert_eq!(api.delete_list(&id).unwrap().status, 204);
        let err = api.get_list(&id).unwrap_err();
        assert_eq!(err.http_status(), 404);
        assert!(matches!(api.delete_list("x"), Err(Error::InvalidId { entity: "list" })));
    }

    #[test]
    fn test_activate_and_move() {
        let mut api = api();
        api.create_list(&body(serde_json::json!({"name": "A"}))).unwrap();
        let second = api.create_list(&body(serde_json::json!({"name": "B"}))).unwrap();
        let id = json(&second)["id"].to_string();

        let active = api.activate_list(&id).unwrap();
        assert_eq!(json(&active)["is_active"], true);

        api.move_list(&id, MoveDirection::Up).unwrap();
        let lists = api.list_lists().unwrap();
        assert_eq!(json(&lists)["lists"][0]["name"], "B");
        assert_eq!(json(&lists)["lists"][1]["is_active"], false);
    }
}
