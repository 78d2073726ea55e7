//! Item history handlers.

use serde::Deserialize;

use super::{Api, ApiResponse, parse_body, parse_id};
use crate::broadcast::EventKind;
use crate::error::{Error, Result};
use crate::release::ReleaseSource;
use crate::validate::{MAX_ITEM_NAME_LENGTH, require_name};

/// `section_id` 0 or absent records the name without a section.
#[derive(Debug, Deserialize)]
pub struct CreateHistoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub section_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteHistoryRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

impl<S: ReleaseSource> Api<S> {
    /// All history entries, most used first, as `{items}`.
    pub fn list_history(&self) -> Result<ApiResponse> {
        let items = self.storage.list_history(None)?;
        ApiResponse::ok(serde_json::json!({ "items": items }))
    }

    pub fn create_history(&mut self, body: &[u8]) -> Result<ApiResponse> {
        let req: CreateHistoryRequest = parse_body(body)?;
        let name = req.name.trim();
        require_name(name, MAX_ITEM_NAME_LENGTH)?;

        let section_id = (req.section_id != 0).then_some(req.section_id);
        self.storage.save_history(name, section_id)?;
        self.events.notify(EventKind::HistoryUpdated);
        ApiResponse::created(serde_json::json!({
            "message": "History entry created",
            "name": name,
        }))
    }

    pub fn delete_history(&mut self, id: &str) -> Result<ApiResponse> {
        let id = parse_id(id, "history")?;
        self.storage.delete_history(id)?;
        self.events.notify(EventKind::HistoryUpdated);
        Ok(ApiResponse::no_content())
    }

    /// Delete several entries; unknown IDs are ignored. Returns `{deleted}`.
    pub fn delete_history_batch(&mut self, body: &[u8]) -> Result<ApiResponse> {
        let req: BatchDeleteHistoryRequest = parse_body(body)?;
        if req.ids.is_empty() {
            return Err(Error::Validation("IDs array is required".to_string()));
        }

        let deleted = self.storage.delete_history_batch(&req.ids)?;
        if deleted > 0 {
            self.events.notify(EventKind::HistoryUpdated);
        }
        ApiResponse::ok(serde_json::json!({ "deleted": deleted }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{api, body, json};

    #[test]
    fn test_create_and_list_history() {
        let mut api = api();
        let created = api
            .create_history(&body(serde_json::json!({"name": "Eggs"})))
            .unwrap();
        assert_eq!(created.status, 201);
        assert_eq!(json(&created)["message"], "History entry created");

        api.create_history(&body(serde_json::json!({"name": "eggs"}))).unwrap();
        let listed = api.list_history().unwrap();
        let items = json(&listed)["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["usage_count"], 2);
    }

    #[test]
    fn test_create_history_unknown_section() {
        let mut api = api();
        let err = api
            .create_history(&body(serde_json::json!({"name": "Eggs", "section_id": 12})))
            .unwrap_err();
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.to_api_json()["message"], "Section not found");
    }

    #[test]
    fn test_history_name_limits() {
        let mut api = api();
        let err = api.create_history(&body(serde_json::json!({"name": ""}))).unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
        let err = api
            .create_history(&body(serde_json::json!({"name": "x".repeat(201)})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Name exceeds maximum length of 200 characters");
    }

    #[test]
    fn test_delete_history() {
        let mut api = api();
        api.create_history(&body(serde_json::json!({"name": "A"}))).unwrap();
        api.create_history(&body(serde_json::json!({"name": "B"}))).unwrap();
        let listed = api.list_history().unwrap();
        let ids: Vec<i64> = json(&listed)["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect();

        assert_eq!(api.delete_history(&ids[0].to_string()).unwrap().status, 204);
        assert_eq!(
            api.delete_history(&ids[0].to_string()).unwrap_err().to_api_json()["message"],
            "History entry not found"
        );

        let err = api
            .delete_history_batch(&body(serde_json::json!({"ids": []})))
            .unwrap_err();
        assert_eq!(err.to_string(), "IDs array is required");

        let response = api
            .delete_history_batch(&body(serde_json::json!({"ids": [ids[1], 999]})))
            .unwrap();
        assert_eq!(json(&response)["deleted"], 1);
    }
}
