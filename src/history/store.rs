//! Search history state machine over a single persisted blob

use super::codec::{contains_separator, decode, encode};
use super::{Clock, HistoryError, SearchHistoryItem, SystemClock};
use crate::core::types::ValueType;
use crate::storage::KeyValueStore;
use tracing::{debug, warn};

/// Maximum number of remembered searches by default
pub const DEFAULT_CAPACITY: usize = 50;

/// Store key the history blob lives under by default
pub const DEFAULT_STORE_KEY: &str = "search_history";

/// Bounded, deduplicated, most-recent-first search history
///
/// Every call reads and rewrites the whole blob; concurrent writers resolve
/// last-writer-wins.
#[derive(Debug)]
pub struct SearchHistoryStore<S, C = SystemClock> {
    store: S,
    clock: C,
    key: String,
    capacity: usize,
}

impl<S: KeyValueStore> SearchHistoryStore<S, SystemClock> {
    /// Creates a history with the default key and capacity
    pub fn new(store: S) -> Self {
        SearchHistoryStore::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> SearchHistoryStore<S, C> {
    /// Creates a history with an explicit clock
    pub fn with_clock(store: S, clock: C) -> Self {
        SearchHistoryStore {
            store,
            clock,
            key: DEFAULT_STORE_KEY.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Overrides the store key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Overrides the capacity (at least one item)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a submitted search
    ///
    /// Blank expressions and expressions containing a record or field
    /// separator are ignored.
    pub fn add(&self, expression: &str, value_type: ValueType) {
        if expression.trim().is_empty() {
            return;
        }
        if contains_separator(expression) {
            debug!(?expression, "history add ignored, expression contains a separator");
            return;
        }

        let mut items = self.get_all();
        items.retain(|item| !item.matches(expression, value_type));
        items.insert(
            0,
            SearchHistoryItem {
                expression: expression.to_string(),
                value_type,
                timestamp: self.clock.now_millis(),
            },
        );
        items.truncate(self.capacity);

        debug!(expression, %value_type, len = items.len(), "history add");
        self.persist(&items);
    }

    /// Every remembered search, most recent first
    ///
    /// Returns an empty list when nothing is stored or the store cannot be
    /// read.
    pub fn get_all(&self) -> Vec<SearchHistoryItem> {
        match self.load() {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "history unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Removes every record with this `(expression, value_type)` identity
    pub fn delete(&self, expression: &str, value_type: ValueType) {
        let mut items = self.get_all();
        let before = items.len();
        items.retain(|item| !item.matches(expression, value_type));

        debug!(expression, %value_type, removed = before - items.len(), "history delete");
        self.persist(&items);
    }

    /// Drops the persisted history entirely
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!(error = %e, key = %self.key, "failed to clear history");
        } else {
            debug!(key = %self.key, "history cleared");
        }
    }

    fn load(&self) -> Result<Vec<SearchHistoryItem>, HistoryError> {
        let blob = self
            .store
            .get(&self.key)
            .map_err(|e| HistoryError::StoreCorrupt(e.to_string()))?;
        Ok(blob.map(|b| decode(&b)).unwrap_or_default())
    }

    fn persist(&self, items: &[SearchHistoryItem]) {
        if let Err(e) = self.store.put(&self.key, &encode(items)) {
            warn!(error = %e, key = %self.key, "failed to persist history");
        }
    }
}
