//! Error Module - UGC Error Types
//!
//! Defines all error types used in UGC.

use thiserror::Error;

/// Main error type for all UGC operations
#[derive(Debug, Error)]
pub enum UgcError {
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result type alias for UGC operations
pub type Result<T> = std::result::Result<T, UgcError>;
