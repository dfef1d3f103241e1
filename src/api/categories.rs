//! Category endpoints

use super::client::ApiClient;
use super::transport::ApiRequest;
use crate::error::{TrackrError, TrackrResult};
use crate::models::{Category, CategoryId, CategoryUpdate, ListResponse, NewCategory};

const CATEGORIES_PATH: &str = "/api/categories/";

fn detail_path(id: CategoryId) -> String {
    format!("{}{}/", CATEGORIES_PATH, id)
}

fn not_found(id: CategoryId) -> impl FnOnce(TrackrError) -> TrackrError {
    move |e| match e.status() {
        Some(404) => TrackrError::category_not_found(id.to_string()),
        _ => e,
    }
}

pub struct CategoriesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CategoriesApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> TrackrResult<Vec<Category>> {
        let response: ListResponse<Category> = self.client.get_json(CATEGORIES_PATH, Vec::new())?;
        Ok(response.into_page().results)
    }

    pub fn get(&self, id: CategoryId) -> TrackrResult<Category> {
        self.client
            .send_json(ApiRequest::get(detail_path(id)))
            .map_err(not_found(id))
    }

    pub fn create(&self, category: &NewCategory) -> TrackrResult<Category> {
        category.validate()?;
        let body = serde_json::to_value(category)?;
        self.client
            .send_json(ApiRequest::post(CATEGORIES_PATH).with_json(body))
    }

    pub fn update(&self, id: CategoryId, update: &CategoryUpdate) -> TrackrResult<Category> {
        update.validate()?;
        let body = serde_json::to_value(update)?;
        self.client
            .send_json(ApiRequest::patch(detail_path(id)).with_json(body))
            .map_err(not_found(id))
    }

    pub fn delete(&self, id: CategoryId) -> TrackrResult<()> {
        self.client
            .send_empty(ApiRequest::delete(detail_path(id)))
            .map_err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::mock_client;
    use crate::api::Method;
    use crate::storage::MemoryTokenStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_list_and_create() {
        let (client, log) = mock_client(
            Arc::new(MemoryTokenStore::with_tokens("a", None)),
            |req| match req.method {
                Method::Get => (200, json!([{"id": 1, "name": "Food", "is_default": true}])),
                _ => (201, json!({"id": 2, "name": "Travel", "color": "#0ea5e9"})),
            },
        );
        let api = CategoriesApi::new(&client);

        let categories = api.list().unwrap();
        assert_eq!(categories.len(), 1);
        assert!(categories[0].is_default);

        let created = api
            .create(&NewCategory {
                name: "Travel".into(),
                icon: None,
                color: Some("#0ea5e9".into()),
            })
            .unwrap();
        assert_eq!(created.id, CategoryId::new(2));
        assert_eq!(
            log.last().unwrap().json(),
            Some(&json!({"name": "Travel", "color": "#0ea5e9"}))
        );
    }

    #[test]
    fn test_invalid_color_never_sent() {
        let (client, log) = mock_client(Arc::new(MemoryTokenStore::new()), |_| (201, json!({})));
        let result = CategoriesApi::new(&client).create(&NewCategory {
            name: "Travel".into(),
            icon: None,
            color: Some("blue".into()),
        });
        assert!(result.is_err());
        assert!(log.requests().is_empty());
    }

    #[test]
    fn test_delete_missing() {
        let (client, _) = mock_client(Arc::new(MemoryTokenStore::new()), |_| (404, json!({})));
        let err = CategoriesApi::new(&client)
            .delete(CategoryId::new(5))
            .unwrap_err();
        assert!(matches!(err, TrackrError::NotFound { .. }));
    }
}
