//! Analytics endpoints (read-only, computed server-side)

use serde_json::Value;

use super::client::ApiClient;
use super::decode_collection;
use crate::error::TrackrResult;
use crate::models::{AnalyticsRange, AnalyticsSummary, CategoryAnalytics, MonthlyData};

const SUMMARY_PATH: &str = "/api/analytics/summary/";
const BY_CATEGORY_PATH: &str = "/api/analytics/by-category/";
const BY_MONTH_PATH: &str = "/api/analytics/by-month/";

pub struct AnalyticsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AnalyticsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn summary(&self, range: &AnalyticsRange) -> TrackrResult<AnalyticsSummary> {
        range.validate()?;
        self.client.get_json(SUMMARY_PATH, range.to_query())
    }

    pub fn by_category(&self, range: &AnalyticsRange) -> TrackrResult<Vec<CategoryAnalytics>> {
        range.validate()?;
        let body: Value = self.client.get_json(BY_CATEGORY_PATH, range.to_query())?;
        decode_collection(body, &["categories", "data", "results"])
    }

    pub fn by_month(&self, range: &AnalyticsRange) -> TrackrResult<Vec<MonthlyData>> {
        range.validate()?;
        let body: Value = self.client.get_json(BY_MONTH_PATH, range.to_query())?;
        decode_collection(body, &["months", "data", "results"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::mock_client;
    use crate::storage::MemoryTokenStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_summary_passed_through() {
        let (client, _) = mock_client(Arc::new(MemoryTokenStore::new()), |_| {
            (200, json!({"total_income": "100.00", "total_expenses": "250.00", "net_balance": "-150.00"}))
        });
        let summary = AnalyticsApi::new(&client)
            .summary(&AnalyticsRange::default())
            .unwrap();
        assert_eq!(summary.net_balance.cents(), -15_000);
    }

    #[test]
    fn test_by_month_wrapped() {
        let (client, log) = mock_client(Arc::new(MemoryTokenStore::new()), |_| {
            (200, json!({"months": [{"month": "2024-03", "income": "1.00", "expenses": "2.00", "net": "-1.00"}]}))
        });
        let range = AnalyticsRange {
            months: Some(3),
            ..Default::default()
        };
        let rows = AnalyticsApi::new(&client).by_month(&range).unwrap();
        assert_eq!(rows[0].month, "2024-03");
        assert_eq!(log.last().unwrap().query_value("months"), Some("3"));
    }

    #[test]
    fn test_by_category_bare() {
        let (client, _) = mock_client(Arc::new(MemoryTokenStore::new()), |_| {
            (200, json!([{"category_name": "Food", "total": "12.00", "percentage": 100.0}]))
        });
        let rows = AnalyticsApi::new(&client)
            .by_category(&AnalyticsRange::default())
            .unwrap();
        assert_eq!(rows[0].label(), "Food");
    }
}
