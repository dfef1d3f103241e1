//! User profile endpoints

use super::client::ApiClient;
use super::transport::ApiRequest;
use crate::error::{TrackrError, TrackrResult};
use crate::models::{ProfileUpdate, User};

const PROFILE_PATH: &str = "/api/users/me/";

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn me(&self) -> TrackrResult<User> {
        self.client.send_json(ApiRequest::get(PROFILE_PATH))
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> TrackrResult<User> {
        if update.is_empty() {
            return Err(TrackrError::Validation("No changes specified".into()));
        }
        if let Some(email) = &update.email {
            if !crate::models::auth::is_plausible_email(email) {
                return Err(TrackrError::Validation(format!(
                    "'{}' is not a valid email address",
                    email
                )));
            }
        }
        let body = serde_json::to_value(update)?;
        self.client
            .send_json(ApiRequest::patch(PROFILE_PATH).with_json(body))
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
    fn test_update_profile_sends_only_changed_fields() {
        let store = Arc::new(MemoryTokenStore::with_tokens("a", Some("r")));
        let (client, log) = mock_client(store, |_| {
            (200, json!({"id": 1, "email": "ada@example.com", "first_name": "Ada"}))
        });

        let update = ProfileUpdate {
            first_name: Some("Ada".into()),
            ..Default::default()
        };
        let user = UsersApi::new(&client).update_profile(&update).unwrap();
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(log.last().unwrap().json(), Some(&json!({"first_name": "Ada"})));
    }

    #[test]
    fn test_empty_update_rejected() {
        let (client, log) = mock_client(Arc::new(MemoryTokenStore::new()), |_| (200, json!({})));
        assert!(UsersApi::new(&client)
            .update_profile(&ProfileUpdate::default())
            .is_err());
        assert!(log.requests().is_empty());
    }
}
