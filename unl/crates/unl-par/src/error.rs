//! Error types for parsing Unlambda programs.

use thiserror::Error;
use ugc::UgcError;
use unl_lex::LexError;

/// Errors raised while building the expression tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input contained no expression at all.
    #[error("empty program")]
    EmptyProgram,

    /// End of input while applications were still waiting for operands.
    #[error("unexpected end of input inside an application")]
    UnexpectedEof,

    /// Tokenizer failure (unknown byte, truncated payload, I/O).
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The heap could not hold the program tree.
    #[error(transparent)]
    Heap(#[from] UgcError),
}

/// Result type alias for parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
