//! Budget endpoints

use super::client::ApiClient;
use super::transport::ApiRequest;
use crate::error::{TrackrError, TrackrResult};
use crate::models::{Budget, BudgetId, BudgetMonth, BudgetUpdate, ListResponse, NewBudget};

const BUDGETS_PATH: &str = "/api/budgets/";

fn detail_path(id: BudgetId) -> String {
    format!("{}{}/", BUDGETS_PATH, id)
}

fn not_found(id: BudgetId) -> impl FnOnce(TrackrError) -> TrackrError {
    move |e| match e.status() {
        Some(404) => TrackrError::budget_not_found(id.to_string()),
        _ => e,
    }
}

pub struct BudgetsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> BudgetsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Budgets, optionally restricted to one month
    pub fn list(&self, month: Option<BudgetMonth>) -> TrackrResult<Vec<Budget>> {
        let query = month
            .map(|m| vec![("month".to_string(), m.to_string())])
            .unwrap_or_default();
        let response: ListResponse<Budget> = self.client.get_json(BUDGETS_PATH, query)?;
        Ok(response.into_page().results)
    }

    pub fn create(&self, budget: &NewBudget) -> TrackrResult<Budget> {
        budget.validate()?;
        let body = serde_json::to_value(budget)?;
        self.client
            .send_json(ApiRequest::post(BUDGETS_PATH).with_json(body))
    }

    pub fn update(&self, id: BudgetId, update: &BudgetUpdate) -> TrackrResult<Budget> {
        update.validate()?;
        let body = serde_json::to_value(update)?;
        self.client
            .send_json(ApiRequest::patch(detail_path(id)).with_json(body))
            .map_err(not_found(id))
    }

    pub fn delete(&self, id: BudgetId) -> TrackrResult<()> {
        self.client
            .send_empty(ApiRequest::delete(detail_path(id)))
            .map_err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::mock_client;
    use crate::models::{CategoryId, Money};
    use crate::storage::MemoryTokenStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_list_by_month() {
        let (client, log) = mock_client(Arc::new(MemoryTokenStore::new()), |_| {
            (200, json!([{
                "id": 1, "category": 2, "category_name": "Food",
                "amount": "300.00", "month": "2024-04-01",
                "spent": "330.00", "remaining": "-30.00",
                "percentage": 110.0, "is_over_budget": true
            }]))
        });
        let month: BudgetMonth = "2024-04".parse().unwrap();
        let budgets = BudgetsApi::new(&client).list(Some(month)).unwrap();

        assert!(budgets[0].is_over_budget);
        assert_eq!(budgets[0].percentage, 110.0);
        assert_eq!(log.last().unwrap().query_value("month"), Some("2024-04"));
    }

    #[test]
    fn test_create_sends_first_of_month() {
        let (client, log) = mock_client(Arc::new(MemoryTokenStore::new()), |_| {
            (201, json!({"id": 1, "category": 2, "amount": "300.00", "month": "2024-04-01"}))
        });
        BudgetsApi::new(&client)
            .create(&NewBudget {
                category: CategoryId::new(2),
                amount: Money::from_cents(30_000),
                month: "2024-04".parse().unwrap(),
            })
            .unwrap();
        assert_eq!(
            log.last().unwrap().json(),
            Some(&json!({"category": 2, "amount": "300.00", "month": "2024-04-01"}))
        );
    }

    #[test]
    fn test_zero_amount_rejected_locally() {
        let (client, log) = mock_client(Arc::new(MemoryTokenStore::new()), |_| (201, json!({})));
        let result = BudgetsApi::new(&client).create(&NewBudget {
            category: CategoryId::new(2),
            amount: Money::zero(),
            month: BudgetMonth::current(),
        });
        assert!(result.is_err());
        assert!(log.requests().is_empty());
    }
}
