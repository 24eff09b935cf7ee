//! Error types for tokenizing Unlambda source.

use thiserror::Error;

/// Errors raised while tokenizing program text.
///
/// All of these are fatal: there is no error recovery in the surface
/// syntax, a bad byte or a truncated program aborts the run.
#[derive(Debug, Error)]
pub enum LexError {
    /// A byte that is neither a significant character, whitespace nor the
    /// start of a comment.
    #[error("unexpected byte 0x{byte:02x} at line {line}, column {column}")]
    UnknownByte { byte: u8, line: u32, column: u32 },

    /// End of input where `.` or `?` still expected its payload byte.
    #[error("unexpected end of input after '{intro}' at line {line}, column {column}")]
    UnexpectedEof { intro: char, line: u32, column: u32 },

    /// The underlying reader failed.
    #[error("i/o error while reading program: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lexing operations
pub type Result<T> = std::result::Result<T, LexError>;
