//! Query/mutation cache
//!
//! Server state fetched through the API is cached per `QueryKey`. Reads go
//! through `fetch`, which returns a fresh entry or calls the fetcher.
//! Writes go through `mutate`, which on success drops every entry of the
//! affected resources so the next read refetches. Cached values are never
//! patched in place.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::trace;

use crate::error::TrackrResult;

/// Server-side resource families a cache entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Expenses,
    Categories,
    CategoryRules,
    Budgets,
    Analytics,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Expenses => "expenses",
            Self::Categories => "categories",
            Self::CategoryRules => "category-rules",
            Self::Budgets => "budgets",
            Self::Analytics => "analytics",
        };
        write!(f, "{}", name)
    }
}

/// Cache key: a resource plus whatever parameters shaped the query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub params: String,
}

impl QueryKey {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: String::new(),
        }
    }

    pub fn with_params(resource: Resource, params: impl Into<String>) -> Self {
        Self {
            resource,
            params: params.into(),
        }
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    stored_at: Instant,
}

pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Entry>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// A fresh cached value for `key`, if one of type `T` exists
    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Return the cached value or fetch, store and return a new one
    ///
    /// Fetch errors are returned and nothing is stored.
    pub fn fetch<T, F>(&self, key: QueryKey, fetcher: F) -> TrackrResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> TrackrResult<T>,
    {
        if let Some(value) = self.get::<T>(&key) {
            trace!(resource = %key.resource, params = %key.params, "cache hit");
            return Ok(value);
        }

        trace!(resource = %key.resource, params = %key.params, "cache miss");
        let value = fetcher()?;
        self.entries.write().insert(
            key,
            Entry {
                value: Arc::new(value.clone()),
                stored_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Run a mutation; on success invalidate every listed resource
    pub fn mutate<T, F>(&self, resources: &[Resource], op: F) -> TrackrResult<T>
    where
        F: FnOnce() -> TrackrResult<T>,
    {
        let result = op()?;
        for resource in resources {
            self.invalidate(*resource);
        }
        Ok(result)
    }

    /// Drop all entries of a resource, returning how many were removed
    pub fn invalidate(&self, resource: Resource) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.resource != resource);
        let removed = before - entries.len();
        if removed > 0 {
            trace!(%resource, removed, "cache invalidated");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackrError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stand-in for the backend's transaction table
    struct FakeBackend {
        rows: Mutex<Vec<String>>,
        list_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(rows: &[&str]) -> Self {
            Self {
                rows: Mutex::new(rows.iter().map(|s| s.to_string()).collect()),
                list_calls: AtomicUsize::new(0),
            }
        }

        fn list(&self) -> TrackrResult<Vec<String>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.lock().clone())
        }

        fn calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    fn list_key() -> QueryKey {
        QueryKey::with_params(Resource::Expenses, "page=1")
    }

    #[test]
    fn test_fetch_caches() {
        let cache = QueryCache::default();
        let backend = FakeBackend::new(&["coffee"]);

        let first = cache.fetch(list_key(), || backend.list()).unwrap();
        let second = cache.fetch(list_key(), || backend.list()).unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_create_then_list_refetches() {
        let cache = QueryCache::default();
        let backend = FakeBackend::new(&["coffee"]);

        cache.fetch(list_key(), || backend.list()).unwrap();
        cache
            .mutate(&[Resource::Expenses, Resource::Analytics], || {
                backend.rows.lock().push("rent".into());
                Ok(())
            })
            .unwrap();

        let rows = cache.fetch(list_key(), || backend.list()).unwrap();
        assert_eq!(rows, vec!["coffee".to_string(), "rent".to_string()]);
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_update_and_delete_refetch() {
        let cache = QueryCache::default();
        let backend = FakeBackend::new(&["coffee", "rent"]);
        cache.fetch(list_key(), || backend.list()).unwrap();

        cache
            .mutate(&[Resource::Expenses], || {
                backend.rows.lock()[0] = "espresso".into();
                Ok(())
            })
            .unwrap();
        let rows = cache.fetch(list_key(), || backend.list()).unwrap();
        assert_eq!(rows[0], "espresso");

        cache
            .mutate(&[Resource::Expenses], || {
                backend.rows.lock().remove(1);
                Ok(())
            })
            .unwrap();
        let rows = cache.fetch(list_key(), || backend.list()).unwrap();
        assert_eq!(rows, vec!["espresso".to_string()]);
        assert_eq!(backend.calls(), 3);
    }

    #[test]
    fn test_failed_mutation_keeps_cache() {
        let cache = QueryCache::default();
        let backend = FakeBackend::new(&["coffee"]);
        cache.fetch(list_key(), || backend.list()).unwrap();

        let result: TrackrResult<()> = cache.mutate(&[Resource::Expenses], || {
            Err(TrackrError::Validation("Amount must be greater than zero".into()))
        });
        assert!(result.is_err());

        cache.fetch(list_key(), || backend.list()).unwrap();
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_invalidate_is_per_resource() {
        let cache = QueryCache::default();
        cache
            .fetch(QueryKey::new(Resource::Categories), || Ok(vec![1u32]))
            .unwrap();
        cache
            .fetch(QueryKey::with_params(Resource::Expenses, "a"), || Ok(2u32))
            .unwrap();
        cache
            .fetch(QueryKey::with_params(Resource::Expenses, "b"), || Ok(3u32))
            .unwrap();

        assert_eq!(cache.invalidate(Resource::Expenses), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get::<Vec<u32>>(&QueryKey::new(Resource::Categories)),
            Some(vec![1])
        );
    }

    #[test]
    fn test_stale_entries_refetch() {
        let cache = QueryCache::new(Duration::ZERO);
        let backend = FakeBackend::new(&["coffee"]);
        cache.fetch(list_key(), || backend.list()).unwrap();
        cache.fetch(list_key(), || backend.list()).unwrap();
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_fetch_error_not_cached() {
        let cache = QueryCache::default();
        let result: TrackrResult<u32> = cache.fetch(QueryKey::new(Resource::User), || {
            Err(TrackrError::Network("connection refused".into()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
