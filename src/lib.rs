//! Trackr - command-line client for a personal finance service
//!
//! This library holds the client side of Trackr: it signs in against the
//! backend, uploads bank statements, edits transactions, category rules and
//! budgets, and shows the analytics the backend computes. The client never
//! computes financial aggregates itself.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `storage`: JSON file I/O and the token store
//! - `models`: REST resource shapes with client-side validation
//! - `api`: HTTP client with auth interceptors and one module per resource
//! - `cache`: Query cache invalidated by mutations
//! - `services`: Session and statement upload flows
//! - `export`: CSV, JSON and YAML export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use trackr::config::{Settings, TrackrPaths};
//! use trackr::cli::AppContext;
//!
//! let paths = TrackrPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let ctx = AppContext::new(paths, settings, None)?;
//! ctx.session.init();
//! ```

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{TrackrError, TrackrResult};
