//! Error handling for the driver.
//!
//! Every component error funnels into [`DriverError`]; the binary prints
//! it as `error: ...` on standard error and exits non-zero. There are no
//! recoverable errors anywhere in the pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use ugc::UgcError;
use unl_eval::EvalError;
use unl_lex::LexError;
use unl_par::ParseError;

/// Main error type for an interpreter run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The named program file could not be opened.
    #[error("cannot open program file {}: {source}", path.display())]
    OpenProgram { path: PathBuf, source: io::Error },

    /// Building the program tree failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Discarding the trailing program line failed.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Evaluation failed (I/O, heap exhaustion, invariant violation).
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Heap setup failed.
    #[error(transparent)]
    Heap(#[from] UgcError),

    /// Statistics could not be rendered.
    #[error("cannot render statistics: {0}")]
    Stats(#[from] serde_json::Error),
}

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;
