//! Core module containing fundamental types for the working set
//!
//! This module provides the foundational building blocks used throughout
//! the crate: address identities, value types, entries and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, AddressEntry, MemoryRangeTag, MemoryValue, ScanHit, ValueType, WorksetError,
    WorksetResult,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
