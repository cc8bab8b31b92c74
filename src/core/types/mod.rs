//! Core type definitions for the working set
//!
//! This module contains the value types shared by every component: the
//! address identity, numeric value types, working-set entries and errors.

mod address;
mod entry;
mod error;
mod value;

// Re-export all public types
pub use address::Address;
pub use entry::{now_millis, AddressEntry, MemoryRangeTag, ScanHit};
pub use error::{WorksetError, WorksetResult};
pub use value::{MemoryValue, ValueType};

// Common type aliases
pub type Offset = i64;
pub type Timestamp = i64;
