//! Transaction (expense) endpoints

use serde_json::{json, Value};
use tracing::debug;

use super::client::ApiClient;
use super::decode_collection;
use super::transport::{ApiRequest, FileUpload, ProgressCallback};
use crate::error::{TrackrError, TrackrResult};
use crate::models::{
    CategoryId, ListResponse, NewTransaction, Page, ParsedTransaction, Transaction,
    TransactionFilter, TransactionId, TransactionUpdate, UploadResult,
};

const EXPENSES_PATH: &str = "/api/expenses/";
const UPLOAD_PATH: &str = "/api/expenses/upload/";
const BULK_CREATE_PATH: &str = "/api/expenses/bulk_create/";

/// Upper bound on pages fetched by `list_all`
const MAX_PAGES: u32 = 200;

fn detail_path(id: TransactionId) -> String {
    format!("{}{}/", EXPENSES_PATH, id)
}

pub struct ExpensesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ExpensesApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of transactions matching the filter
    pub fn list(&self, filter: &TransactionFilter) -> TrackrResult<Page<Transaction>> {
        filter.validate()?;
        let response: ListResponse<Transaction> = self
            .client
            .get_json(EXPENSES_PATH, filter.to_query(self.client.revision()))?;
        Ok(response.into_page())
    }

    /// Every transaction matching the filter, following `next` links
    pub fn list_all(&self, filter: &TransactionFilter) -> TrackrResult<Vec<Transaction>> {
        let mut filter = filter.clone();
        let mut page_number = filter.page.unwrap_or(1);
        let mut all = Vec::new();

        loop {
            filter.page = if page_number == 1 { None } else { Some(page_number) };
            let page = self.list(&filter)?;
            let has_next = page.has_next();
            all.extend(page.results);

            if !has_next {
                break;
            }
            if page_number >= MAX_PAGES {
                debug!(pages = page_number, "stopping pagination at page limit");
                break;
            }
            page_number += 1;
        }

        Ok(all)
    }

    pub fn get(&self, id: TransactionId) -> TrackrResult<Transaction> {
        self.client
            .send_json(ApiRequest::get(detail_path(id)))
            .map_err(|e| match e.status() {
                Some(404) => TrackrError::transaction_not_found(id.to_string()),
                _ => e,
            })
    }

    pub fn create(&self, transaction: &NewTransaction) -> TrackrResult<Transaction> {
        transaction.validate()?;
        self.client.send_json(
            ApiRequest::post(EXPENSES_PATH)
                .with_json(transaction.to_payload(self.client.revision())),
        )
    }

    pub fn update(&self, id: TransactionId, update: &TransactionUpdate) -> TrackrResult<Transaction> {
        update.validate()?;
        self.client.send_json(
            ApiRequest::patch(detail_path(id)).with_json(update.to_payload(self.client.revision())),
        )
    }

    pub fn delete(&self, id: TransactionId) -> TrackrResult<()> {
        self.client
            .send_empty(ApiRequest::delete(detail_path(id)))
            .map_err(|e| match e.status() {
                Some(404) => TrackrError::transaction_not_found(id.to_string()),
                _ => e,
            })
    }

    /// Upload a statement and get back the parsed rows without storing them
    pub fn upload_preview(
        &self,
        upload: FileUpload,
        progress: Option<ProgressCallback>,
    ) -> TrackrResult<Vec<ParsedTransaction>> {
        let body: Value = self.client.send_json(
            ApiRequest::post(UPLOAD_PATH)
                .with_file(upload)
                .with_progress(progress),
        )?;
        decode_collection(body, &["transactions", "preview", "results"])
    }

    /// Store a reviewed set of rows in one request
    pub fn bulk_create(&self, transactions: &[NewTransaction]) -> TrackrResult<UploadResult> {
        if transactions.is_empty() {
            return Err(TrackrError::Validation("No transactions to create".into()));
        }
        for transaction in transactions {
            transaction.validate()?;
        }

        let revision = self.client.revision();
        let payload: Vec<Value> = transactions.iter().map(|t| t.to_payload(revision)).collect();
        let body: Value = self.client.send_json(
            ApiRequest::post(BULK_CREATE_PATH).with_json(json!({ "transactions": payload })),
        )?;

        if body.is_array() {
            let created: Vec<Transaction> = decode_collection(body, &[])?;
            return Ok(UploadResult {
                created: created.len() as u64,
                transactions: created,
                ..Default::default()
            });
        }

        let mut result: UploadResult = serde_json::from_value(body)?;
        if result.created == 0 && !result.transactions.is_empty() {
            result.created = result.transactions.len() as u64;
        }
        Ok(result)
    }

    /// Reassign (or clear) a transaction's category
    pub fn update_category(
        &self,
        id: TransactionId,
        category: Option<CategoryId>,
    ) -> TrackrResult<Transaction> {
        let body = json!({ "category": category.map(|c| c.get()) });
        self.client.send_json(
            ApiRequest::patch(format!("{}update_category/", detail_path(id))).with_json(body),
        )
    }
}
