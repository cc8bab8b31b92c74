//! Persisted search-expression history
//!
//! A bounded, deduplicated, most-recent-first log of submitted searches,
//! stored as one delimited string under a single key of a
//! [`KeyValueStore`](crate::storage::KeyValueStore). History is a
//! convenience: every failure is logged and recovered, never surfaced.

pub mod codec;
mod store;

pub use store::{SearchHistoryStore, DEFAULT_CAPACITY, DEFAULT_STORE_KEY};

use crate::core::types::{now_millis, Timestamp, ValueType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One submitted search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryItem {
    pub expression: String,
    pub value_type: ValueType,
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
}

impl SearchHistoryItem {
    /// Whether this item has the dedup identity `(expression, value_type)`
    pub fn matches(&self, expression: &str, value_type: ValueType) -> bool {
        self.value_type == value_type && self.expression == expression
    }
}

/// Internal history failures; recovered by the store
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Malformed history record: {0}")]
    MalformedRecord(String),

    #[error("History store corrupt: {0}")]
    StoreCorrupt(String),
}

/// Source of history timestamps
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Timestamp {
        now_millis()
    }
}
