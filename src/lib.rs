//! Address working set for memory scanners
//!
//! Keeps the user-curated set of captured addresses, the selection over it,
//! offset/XOR analysis of address groups, and a persisted search history.

pub mod analysis;
pub mod config;
pub mod core;
pub mod history;
pub mod storage;
pub mod workset;

// Re-export main types from core module
pub use self::core::types::{
    Address, AddressEntry, MemoryRangeTag, MemoryValue, ScanHit, ValueType, WorksetError,
    WorksetResult,
};

pub use analysis::{analyze, OffsetAnalysis, OffsetEntry};
pub use history::{SearchHistoryItem, SearchHistoryStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use workset::{
    AddressRegistry, SelectionModel, SelectionState, Workset, WorksetEvent, WorksetHandle,
    WorksetListener,
};

// Re-export core directly for full access
pub use self::core::*;
