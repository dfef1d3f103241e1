//! Local storage for Trackr
//!
//! The client owns very little state of its own: the issued tokens, the
//! settings file, and a statement preview waiting to be committed. All of
//! it is plain JSON written atomically.

pub mod file_io;
pub mod token_store;

pub use file_io::{read_json_optional, remove_if_exists, write_json_atomic};
pub use token_store::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
