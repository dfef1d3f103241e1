//! Statement upload service
//!
//! Two ways to get a bank statement into the backend:
//!
//! - preview: the backend parses the file and returns rows without storing
//!   them. The rows are kept in a local preview file where categories can be
//!   changed and rows dropped, then committed with one bulk create.
//! - direct: the backend parses and stores in one step and reports counts.
//!
//! Files are checked locally first. A file passes if either its extension or
//! its MIME type is one of the accepted statement formats.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{ApiClient, ExpensesApi, FileUpload, ProgressCallback, StatementsApi};
use crate::cache::{QueryCache, Resource};
use crate::error::{TrackrError, TrackrResult};
use crate::models::{Category, CategoryRef, NewTransaction, ParsedTransaction, UploadResult};
use crate::storage::{read_json_optional, remove_if_exists, write_json_atomic};

/// File extensions accepted for statements (lowercase, no dot)
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["csv", "pdf", "xls", "xlsx"];

pub const MIME_CSV: &str = "text/csv";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MIME_TEXT: &str = "text/plain";
const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// MIME types accepted for statements
pub const ACCEPTED_MIME_TYPES: [&str; 5] = [MIME_CSV, "application/csv", MIME_PDF, MIME_XLS, MIME_XLSX];

/// Multipart field the backend reads the statement from
const UPLOAD_FIELD: &str = "file";

/// Bytes inspected when sniffing text content
const SNIFF_LEN: usize = 4096;

const XLS_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Guess a MIME type from the leading bytes of a file
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"%PDF") {
        return MIME_PDF;
    }
    if bytes.starts_with(b"PK\x03\x04") {
        return MIME_XLSX;
    }
    if bytes.starts_with(&XLS_MAGIC) {
        return MIME_XLS;
    }

    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // multi-byte character cut at the sample boundary
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return MIME_OCTET_STREAM,
    };
    let text = text.trim_start_matches('\u{feff}');

    if text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return MIME_OCTET_STREAM;
    }

    let first_line = text.lines().find(|line| !line.trim().is_empty());
    match first_line {
        Some(line) if line.contains(|c: char| matches!(c, ',' | ';' | '\t')) => MIME_CSV,
        _ => MIME_TEXT,
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn is_accepted_extension(file_name: &str) -> bool {
    extension_of(file_name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_accepted_mime(mime: &str) -> bool {
    // ignore parameters such as "; charset=utf-8"
    let essence = mime.split(';').next().unwrap_or_default().trim();
    ACCEPTED_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
}

/// Check a statement before it is sent
///
/// Rejects empty files, files over `max_bytes`, and files where both the
/// extension and the MIME type are unsupported.
pub fn validate_statement_file(
    file_name: &str,
    mime: &str,
    size: u64,
    max_bytes: u64,
) -> TrackrResult<()> {
    if size == 0 {
        return Err(TrackrError::Upload(format!("{} is empty", file_name)));
    }
    if size > max_bytes {
        return Err(TrackrError::Upload(format!(
            "{} is {:.1} MB; the limit is {:.1} MB",
            file_name,
            size as f64 / (1024.0 * 1024.0),
            max_bytes as f64 / (1024.0 * 1024.0)
        )));
    }
    if !is_accepted_extension(file_name) && !is_accepted_mime(mime) {
        return Err(TrackrError::Upload(format!(
            "{} is not a supported statement ({}). Upload a CSV, PDF, XLS or XLSX file.",
            file_name, mime
        )));
    }
    Ok(())
}

/// A statement read from disk and ready to upload
#[derive(Debug, Clone, PartialEq)]
pub struct StatementFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl StatementFile {
    pub fn to_upload(&self) -> FileUpload {
        FileUpload {
            field: UPLOAD_FIELD.to_string(),
            file_name: self.file_name.clone(),
            mime: self.mime.clone(),
            bytes: self.bytes.clone(),
            fields: Vec::new(),
        }
    }
}

/// Read and validate a statement file
///
/// The MIME type is `mime_override` when given, otherwise sniffed from the
/// file content. The size limit is checked before the file is read.
pub fn load_statement_file(
    path: &Path,
    mime_override: Option<&str>,
    max_bytes: u64,
) -> TrackrResult<StatementFile> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| TrackrError::Upload(format!("Invalid file path: {}", path.display())))?
        .to_string();

    let metadata = fs::metadata(path)
        .map_err(|e| TrackrError::Upload(format!("Cannot read {}: {}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(TrackrError::Upload(format!("{} is not a file", path.display())));
    }
    if metadata.len() > max_bytes {
        // report without reading the whole file
        let mime = mime_override.unwrap_or(MIME_OCTET_STREAM);
        validate_statement_file(&file_name, mime, metadata.len(), max_bytes)?;
    }

    let bytes = fs::read(path)
        .map_err(|e| TrackrError::Upload(format!("Cannot read {}: {}", path.display(), e)))?;
    let mime = match mime_override {
        Some(mime) => mime.trim().to_string(),
        None => sniff_mime(&bytes).to_string(),
    };

    validate_statement_file(&file_name, &mime, bytes.len() as u64, max_bytes)?;
    debug!(file = %file_name, %mime, size = bytes.len(), "statement file accepted");

    Ok(StatementFile {
        file_name,
        mime,
        bytes,
    })
}

/// Parsed statement rows waiting to be committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementPreview {
    pub source_file: String,
    pub uploaded_at: DateTime<Utc>,
    pub rows: Vec<ParsedTransaction>,
}

impl StatementPreview {
    pub fn new(source_file: impl Into<String>, rows: Vec<ParsedTransaction>) -> Self {
        Self {
            source_file: source_file.into(),
            uploaded_at: Utc::now(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows are numbered from 1 for display and editing
    fn index(&self, row: usize) -> TrackrResult<usize> {
        if row == 0 || row > self.rows.len() {
            return Err(TrackrError::Validation(format!(
                "Row {} does not exist (preview has {} rows)",
                row,
                self.rows.len()
            )));
        }
        Ok(row - 1)
    }

    /// Assign or clear the category of one row
    pub fn set_category(&mut self, row: usize, category: Option<&Category>) -> TrackrResult<()> {
        let index = self.index(row)?;
        let target = &mut self.rows[index];
        match category {
            Some(category) => {
                target.category = Some(CategoryRef::Nested {
                    id: category.id,
                    name: Some(category.name.clone()),
                });
                target.category_name = Some(category.name.clone());
            }
            None => {
                target.category = None;
                target.category_name = None;
            }
        }
        Ok(())
    }

    /// Drop one row from the set to commit
    pub fn remove(&mut self, row: usize) -> TrackrResult<ParsedTransaction> {
        let index = self.index(row)?;
        Ok(self.rows.remove(index))
    }

    pub fn to_new_transactions(&self) -> Vec<NewTransaction> {
        self.rows
            .iter()
            .map(ParsedTransaction::to_new_transaction)
            .collect()
    }
}

/// The pending preview file
pub struct PreviewStore {
    path: PathBuf,
}

impl PreviewStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> TrackrResult<Option<StatementPreview>> {
        read_json_optional(&self.path)
    }

    /// The pending preview, or an error explaining how to create one
    pub fn require(&self) -> TrackrResult<StatementPreview> {
        self.load()?.ok_or_else(|| {
            TrackrError::Upload(
                "No statement preview is pending. Run 'trackr upload preview <FILE>' first.".into(),
            )
        })
    }

    pub fn save(&self, preview: &StatementPreview) -> TrackrResult<()> {
        write_json_atomic(&self.path, preview, false)
    }

    /// Delete the pending preview; returns whether one existed
    pub fn discard(&self) -> TrackrResult<bool> {
        let existed = self.path.exists();
        remove_if_exists(&self.path)?;
        Ok(existed)
    }
}

/// Caches that show stored transactions or numbers derived from them
const COMMIT_INVALIDATES: [Resource; 3] = [Resource::Expenses, Resource::Analytics, Resource::Budgets];

/// Service for both upload flows
pub struct UploadService<'a> {
    client: &'a ApiClient,
    cache: &'a QueryCache,
    previews: &'a PreviewStore,
}

impl<'a> UploadService<'a> {
    pub fn new(client: &'a ApiClient, cache: &'a QueryCache, previews: &'a PreviewStore) -> Self {
        Self {
            client,
            cache,
            previews,
        }
    }

    /// Upload for parsing only and keep the rows as the pending preview
    ///
    /// Replaces any earlier pending preview.
    pub fn preview(
        &self,
        file: &StatementFile,
        progress: Option<ProgressCallback>,
    ) -> TrackrResult<StatementPreview> {
        let rows = ExpensesApi::new(self.client).upload_preview(file.to_upload(), progress)?;
        let preview = StatementPreview::new(file.file_name.clone(), rows);
        self.previews.save(&preview)?;
        info!(file = %file.file_name, rows = preview.len(), "statement preview stored");
        Ok(preview)
    }

    pub fn set_category(&self, row: usize, category: Option<&Category>) -> TrackrResult<StatementPreview> {
        let mut preview = self.previews.require()?;
        preview.set_category(row, category)?;
        self.previews.save(&preview)?;
        Ok(preview)
    }

    pub fn remove_row(&self, row: usize) -> TrackrResult<(ParsedTransaction, StatementPreview)> {
        let mut preview = self.previews.require()?;
        let removed = preview.remove(row)?;
        self.previews.save(&preview)?;
        Ok((removed, preview))
    }

    /// Store the edited preview rows and delete the preview
    ///
    /// The preview is kept when the commit fails so it can be retried.
    pub fn commit(&self) -> TrackrResult<UploadResult> {
        let preview = self.previews.require()?;
        if preview.is_empty() {
            return Err(TrackrError::Validation(
                "The preview has no rows left to commit".into(),
            ));
        }

        let transactions = preview.to_new_transactions();
        let result = self.cache.mutate(&COMMIT_INVALIDATES, || {
            ExpensesApi::new(self.client).bulk_create(&transactions)
        })?;

        self.previews.discard()?;
        info!(created = result.created, "statement preview committed");
        Ok(result)
    }

    /// Upload and store in one step
    pub fn upload_direct(
        &self,
        file: &StatementFile,
        progress: Option<ProgressCallback>,
    ) -> TrackrResult<UploadResult> {
        let result = self.cache.mutate(&COMMIT_INVALIDATES, || {
            StatementsApi::new(self.client).upload(file.to_upload(), progress)
        })?;
        info!(
            file = %file.file_name,
            created = result.created,
            skipped = result.skipped,
            "statement uploaded"
        );
        Ok(result)
    }
}
