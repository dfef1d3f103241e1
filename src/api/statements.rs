//! Direct statement upload (the backend parses and stores in one step)

use super::client::ApiClient;
use super::transport::{ApiRequest, FileUpload, ProgressCallback};
use crate::error::TrackrResult;
use crate::models::UploadResult;

const UPLOAD_PATH: &str = "/api/statements/upload/";

pub struct StatementsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StatementsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn upload(
        &self,
        upload: FileUpload,
        progress: Option<ProgressCallback>,
    ) -> TrackrResult<UploadResult> {
        self.client.send_json(
            ApiRequest::post(UPLOAD_PATH)
                .with_file(upload)
                .with_progress(progress),
        )
    }
}
