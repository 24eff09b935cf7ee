//! Error types for the evaluator.

use thiserror::Error;
use ugc::UgcError;

/// Errors that abort evaluation.
///
/// None of these are recoverable: an Unlambda program has no exception
/// surface, so any failure below it tears the run down.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Reading program input or writing program output failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The heap is exhausted.
    #[error(transparent)]
    Heap(#[from] UgcError),

    /// An impossible tag reached `apply` or a non-frame cell was popped
    /// off the continuation spine.
    #[error("internal interpreter error: {0}")]
    Internal(String),
}

impl EvalError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        EvalError::Internal(message.into())
    }
}

/// Result type alias for evaluation
pub type Result<T> = std::result::Result<T, EvalError>;
