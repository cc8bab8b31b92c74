//! Error types for working-set operations

use super::address::Address;
use std::fmt;
use thiserror::Error;

/// Main error type for registry, selection and memory-service interactions
#[derive(Error, Debug)]
pub enum WorksetError {
    #[error("Address already in working set: {0}")]
    DuplicateAddress(Address),

    #[error("Address not in working set: {0}")]
    NotFound(Address),

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Invalid value type: {0}")]
    InvalidValueType(String),

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Buffer too small: expected {expected}, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Working set owner is no longer running")]
    ChannelClosed,
}

/// Result type alias for working-set operations
pub type WorksetResult<T> = Result<T, WorksetError>;

impl WorksetError {
    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        WorksetError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a buffer too small error
    pub fn buffer_too_small(expected: usize, actual: usize) -> Self {
        WorksetError::BufferTooSmall { expected, actual }
    }

    /// Whether the caller should retry with `update` instead of `insert`
    pub fn is_conflict(&self) -> bool {
        matches!(self, WorksetError::DuplicateAddress(_))
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for WorksetError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        WorksetError::ChannelClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for WorksetError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        WorksetError::ChannelClosed
    }
}
