//! REST access to the Trackr backend
//!
//! `ApiClient` owns the transport, the token store and the auth
//! interceptors. Each resource gets a thin borrowed wrapper
//! (`ExpensesApi::new(&client)`) that knows its paths and payload shapes.

pub mod analytics;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod category_rules;
pub mod client;
pub mod expenses;
pub mod statements;
pub mod transport;
pub mod users;

#[cfg(test)]
pub(crate) mod mock;

pub use analytics::AnalyticsApi;
pub use auth::{AuthApi, AuthOutcome};
pub use budgets::BudgetsApi;
pub use categories::CategoriesApi;
pub use category_rules::CategoryRulesApi;
pub use client::ApiClient;
pub use expenses::ExpensesApi;
pub use statements::StatementsApi;
pub use transport::{
    ApiRequest, ApiResponse, FileUpload, Method, ProgressCallback, RequestBody,
    ReqwestTransport, Transport,
};
pub use users::UsersApi;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{TrackrError, TrackrResult};

/// Decode a list that may arrive bare or wrapped in an object
///
/// `keys` are tried in order; failing those, the first array-valued field
/// is used.
pub(crate) fn decode_collection<T: DeserializeOwned>(
    body: Value,
    keys: &[&str],
) -> TrackrResult<Vec<T>> {
    let items = match body {
        Value::Array(_) => body,
        Value::Object(mut map) => {
            let key = keys
                .iter()
                .find(|key| map.get(**key).is_some_and(Value::is_array))
                .map(|key| key.to_string())
                .or_else(|| {
                    map.iter()
                        .find(|(_, value)| value.is_array())
                        .map(|(key, _)| key.clone())
                });

            match key.and_then(|key| map.remove(&key)) {
                Some(items) => items,
                None => {
                    return Err(TrackrError::Json(
                        "Expected a list in the server response".into(),
                    ))
                }
            }
        }
        _ => {
            return Err(TrackrError::Json(
                "Expected a list in the server response".into(),
            ))
        }
    };

    Ok(serde_json::from_value(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_and_wrapped() {
        let bare: Vec<u32> = decode_collection(json!([1, 2]), &["items"]).unwrap();
        assert_eq!(bare, vec![1, 2]);

        let wrapped: Vec<u32> =
            decode_collection(json!({"count": 2, "items": [3, 4]}), &["items"]).unwrap();
        assert_eq!(wrapped, vec![3, 4]);

        let fallback: Vec<u32> = decode_collection(json!({"rows": [5]}), &["items"]).unwrap();
        assert_eq!(fallback, vec![5]);
    }

    #[test]
    fn test_decode_rejects_non_lists() {
        assert!(decode_collection::<u32>(json!({"detail": "x"}), &[]).is_err());
        assert!(decode_collection::<u32>(json!("x"), &[]).is_err());
    }
}
