//! Access/refresh token persistence
//!
//! The web client kept both tokens in browser local storage; here they live
//! in a small JSON file next to the settings. Every implementation is shared
//! between the HTTP client and the session, so all methods take `&self`.

use std::path::PathBuf;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::file_io::{read_json_optional, remove_if_exists, write_json_atomic};
use crate::error::TrackrResult;

/// The pair of credentials issued by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl StoredTokens {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Key-value storage for the access and refresh tokens
pub trait TokenStore: Send + Sync {
    /// Current access token, if any
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if any
    fn refresh_token(&self) -> Option<String>;

    /// Replace both tokens. A `None` refresh token keeps the stored one.
    fn set_tokens(&self, access: &str, refresh: Option<&str>) -> TrackrResult<()>;

    /// Replace only the access token (after a refresh exchange)
    fn set_access_token(&self, access: &str) -> TrackrResult<()>;

    /// Forget both tokens
    fn clear(&self) -> TrackrResult<()>;

    /// Snapshot of both tokens
    fn snapshot(&self) -> StoredTokens {
        StoredTokens {
            access: self.access_token(),
            refresh: self.refresh_token(),
        }
    }

    /// Put back a snapshot taken earlier
    fn restore(&self, tokens: &StoredTokens) -> TrackrResult<()> {
        self.clear()?;
        match &tokens.access {
            Some(access) => self.set_tokens(access, tokens.refresh.as_deref()),
            None => Ok(()),
        }
    }
}

/// Token store kept only in memory
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds tokens
    pub fn with_tokens(access: &str, refresh: Option<&str>) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens {
                access: Some(access.to_string()),
                refresh: refresh.map(str::to_string),
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().refresh.clone()
    }

    fn set_tokens(&self, access: &str, refresh: Option<&str>) -> TrackrResult<()> {
        let mut tokens = self.tokens.write();
        tokens.access = Some(access.to_string());
        if let Some(refresh) = refresh {
            tokens.refresh = Some(refresh.to_string());
        }
        Ok(())
    }

    fn set_access_token(&self, access: &str) -> TrackrResult<()> {
        self.tokens.write().access = Some(access.to_string());
        Ok(())
    }

    fn clear(&self) -> TrackrResult<()> {
        *self.tokens.write() = StoredTokens::default();
        Ok(())
    }
}

/// Token store backed by the credentials file
///
/// The file is read once on open and rewritten on every change.
pub struct FileTokenStore {
    path: PathBuf,
    tokens: RwLock<StoredTokens>,
}

impl FileTokenStore {
    /// Open the store, loading any tokens already on disk
    pub fn open(path: PathBuf) -> TrackrResult<Self> {
        let tokens: StoredTokens = read_json_optional(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            tokens: RwLock::new(tokens),
        })
    }

    fn persist(&self, tokens: &StoredTokens) -> TrackrResult<()> {
        if tokens.is_empty() {
            remove_if_exists(&self.path)
        } else {
            write_json_atomic(&self.path, tokens, true)
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().refresh.clone()
    }

    fn set_tokens(&self, access: &str, refresh: Option<&str>) -> TrackrResult<()> {
        let mut tokens = self.tokens.write();
        tokens.access = Some(access.to_string());
        if let Some(refresh) = refresh {
            tokens.refresh = Some(refresh.to_string());
        }
        self.persist(&tokens)
    }

    fn set_access_token(&self, access: &str) -> TrackrResult<()> {
        let mut tokens = self.tokens.write();
        tokens.access = Some(access.to_string());
        self.persist(&tokens)
    }

    fn clear(&self) -> TrackrResult<()> {
        let mut tokens = self.tokens.write();
        *tokens = StoredTokens::default();
        self.persist(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_keeps_refresh_when_not_rotated() {
        let store = MemoryTokenStore::with_tokens("a1", Some("r1"));
        store.set_tokens("a2", None).unwrap();

        assert_eq!(store.access_token().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryTokenStore::with_tokens("a1", Some("r1"));
        store.clear().unwrap();

        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");

        let store = FileTokenStore::open(path.clone()).unwrap();
        store.set_tokens("access-1", Some("refresh-1")).unwrap();
        store.set_access_token("access-2").unwrap();

        let reopened = FileTokenStore::open(path).unwrap();
        assert_eq!(reopened.access_token().as_deref(), Some("access-2"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");

        let store = FileTokenStore::open(path.clone()).unwrap();
        store.set_tokens("access", Some("refresh")).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_restore_snapshot() {
        let store = MemoryTokenStore::with_tokens("old", Some("old-refresh"));
        let snapshot = store.snapshot();

        store.set_tokens("new", Some("new-refresh")).unwrap();
        store.restore(&snapshot).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("old"));
        assert_eq!(store.refresh_token().as_deref(), Some("old-refresh"));

        store.restore(&StoredTokens::default()).unwrap();
        assert!(store.snapshot().is_empty());
    }
}
