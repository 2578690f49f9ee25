//! Read-mostly, time-expiring cache
//!
//! Entries are immutable once computed, so a single lock around the map is
//! enough: readers share it, and replacing an entry is idempotent.

use crate::client::{EngineError, TemplateRegistry};
use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// A map whose entries expire after a fixed lifetime
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Value for `key` if present and not expired
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.write().insert(key, (Instant::now(), value));
    }

    /// Cached value for `key`, computing and storing it on a miss.
    ///
    /// Failures are returned as is and leave the cache untouched.
    pub fn get_or_try_insert_with<E>(&self, key: K, compute: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop expired entries
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.write().retain(|_, (stored, _)| stored.elapsed() < ttl);
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Clear `cache` every `period` on the current tokio runtime.
///
/// The first clear happens one full period after the call.
pub fn spawn_periodic_clear<K, V>(cache: Arc<TtlCache<K, V>>, period: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            debug!("Clearing {} cached entries", cache.len());
            cache.clear();
        }
    })
}

const TEMPLATES_KEY: &str = "templates";

/// Template registry that remembers the last listing for the cache lifetime
pub struct CachedTemplateRegistry {
    inner: Arc<dyn TemplateRegistry>,
    cache: Arc<TtlCache<&'static str, BTreeSet<String>>>,
}

impl CachedTemplateRegistry {
    pub fn new(inner: Arc<dyn TemplateRegistry>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(TtlCache::new(ttl)),
        }
    }

    /// Shared handle to the underlying cache, e.g. for [`spawn_periodic_clear`]
    pub fn cache(&self) -> Arc<TtlCache<&'static str, BTreeSet<String>>> {
        Arc::clone(&self.cache)
    }
}

impl TemplateRegistry for CachedTemplateRegistry {
    fn list_templates(&self) -> Result<BTreeSet<String>, EngineError> {
        self.cache
            .get_or_try_insert_with(TEMPLATES_KEY, || self.inner.list_templates())
    }
}
