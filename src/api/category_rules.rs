//! Category rule endpoints

use super::client::ApiClient;
use super::transport::ApiRequest;
use crate::error::{TrackrError, TrackrResult};
use crate::models::{CategoryRule, CategoryRuleId, CategoryRuleUpdate, ListResponse, NewCategoryRule};

const RULES_PATH: &str = "/api/category-rules/";

fn detail_path(id: CategoryRuleId) -> String {
    format!("{}{}/", RULES_PATH, id)
}

fn not_found(id: CategoryRuleId) -> impl FnOnce(TrackrError) -> TrackrError {
    move |e| match e.status() {
        Some(404) => TrackrError::NotFound {
            entity_type: "Category rule",
            identifier: id.to_string(),
        },
        _ => e,
    }
}

pub struct CategoryRulesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CategoryRulesApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> TrackrResult<Vec<CategoryRule>> {
        let response: ListResponse<CategoryRule> = self.client.get_json(RULES_PATH, Vec::new())?;
        Ok(response.into_page().results)
    }

    pub fn create(&self, rule: &NewCategoryRule) -> TrackrResult<CategoryRule> {
        rule.validate()?;
        let body = serde_json::to_value(rule)?;
        self.client
            .send_json(ApiRequest::post(RULES_PATH).with_json(body))
    }

    pub fn update(&self, id: CategoryRuleId, update: &CategoryRuleUpdate) -> TrackrResult<CategoryRule> {
        update.validate()?;
        let body = serde_json::to_value(update)?;
        self.client
            .send_json(ApiRequest::patch(detail_path(id)).with_json(body))
            .map_err(not_found(id))
    }

    pub fn delete(&self, id: CategoryRuleId) -> TrackrResult<()> {
        self.client
            .send_empty(ApiRequest::delete(detail_path(id)))
            .map_err(not_found(id))
    }
}
