//! Service layer for Trackr
//!
//! Services sit between the CLI and the API modules, handling state that
//! spans several requests: the signed-in session and statement uploads.

pub mod session;
pub mod upload;

pub use session::Session;
pub use upload::{
    load_statement_file, sniff_mime, validate_statement_file, PreviewStore, StatementFile,
    StatementPreview, UploadService,
};
