//! Memoization of archive queries.
//!
//! Every value is computed at most once per key and then handed out as the same shared [Arc].
//! The cache lives in a [RefCell]: an archive can move to another thread but not be shared
//! between threads.
use crate::Error;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::any::Any;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

/// Identifies a cached query: the query name and, for parameterized queries, its argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: &'static str,
    argument: Option<String>,
}

impl CacheKey {
    pub fn method(method: &'static str) -> Self {
        CacheKey {
            method,
            argument: None,
        }
    }

    pub fn with_argument(method: &'static str, argument: impl Into<String>) -> Self {
        CacheKey {
            method,
            argument: Some(argument.into()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{}({})", self.method, argument),
            None => write!(f, "{}", self.method),
        }
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: RefCell<FxHashMap<CacheKey, Arc<dyn Any + Send + Sync>>>,
}

impl QueryCache {
    pub fn get<T: Any + Send + Sync>(&self, key: &CacheKey) -> Option<Arc<T>> {
        let entry = self.entries.borrow().get(key).cloned()?;
        entry.downcast::<T>().ok()
    }

    /// Stores the value unless the key is already set, and returns the stored value
    pub fn set<T: Any + Send + Sync>(&self, key: CacheKey, value: Arc<T>) -> Arc<T> {
        match self.entries.borrow_mut().entry(key) {
            Entry::Occupied(e) => {
                let stored = Arc::clone(e.get());
                debug_assert!(stored.is::<T>(), "{} is cached with another type", e.key());
                match stored.downcast::<T>() {
                    Ok(stored) => stored,
                    Err(_) => {
                        warn!("{} is cached with another type, not caching it", e.key());
                        value
                    }
                }
            }
            Entry::Vacant(e) => {
                e.insert(value.clone());
                value
            }
        }
    }

    /// Cached value for the key, computing it with `compute` on the first call.
    ///
    /// `compute` may itself query the cache. A failed computation caches nothing, the next call
    /// tries again.
    pub fn get_or_try_insert_with<T, F>(&self, key: CacheKey, compute: F) -> Result<Arc<T>, Error>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, Error>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        debug!("computing {}", key);
        let value = Arc::new(compute()?);
        Ok(self.set(key, value))
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
