//! Derived analysis over working-set subsets

pub mod offsets;

pub use offsets::{analyze, analyze_addresses, format_signed_hex, OffsetAnalysis, OffsetEntry};
