//! Byte cursor for traversing program text.
//!
//! This module provides the `Cursor` struct which pulls single bytes from a
//! reader while tracking line/column information for error reporting.
//!
//! Unlambda programs are byte-oriented (a `.` or `?` payload may be any raw
//! byte) and, when the program arrives on standard input, the bytes after
//! the program belong to the running program's input stream. The cursor
//! therefore wraps an `io::Read` and consumes exactly one byte at a time
//! instead of borrowing a decoded string.

use std::io::{ErrorKind, Read};

/// A cursor that yields one raw byte at a time.
///
/// `line` and `column` always describe the most recently returned byte
/// (1-based), which is what diagnostics want to point at.
///
/// # Example
///
/// ```
/// use unl_lex::cursor::Cursor;
///
/// let mut cursor = Cursor::new(&b"`ii"[..]);
/// assert_eq!(cursor.bump().unwrap(), Some(b'`'));
/// assert_eq!((cursor.line(), cursor.column()), (1, 1));
/// ```
pub struct Cursor<R> {
    /// The byte source.
    inner: R,

    /// Line of the last returned byte (1-based).
    line: u32,

    /// Column of the last returned byte (1-based).
    column: u32,

    /// Set when the last returned byte was a newline, so the next byte
    /// starts a fresh line.
    pending_newline: bool,
}

impl<R: Read> Cursor<R> {
    /// Creates a cursor over the given reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 1,
            column: 0,
            pending_newline: false,
        }
    }

    /// Returns the next byte, or `None` at end of input.
    ///
    /// Interrupted reads are retried; any other I/O failure is returned to
    /// the caller.
    pub fn bump(&mut self) -> std::io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    if self.pending_newline {
                        self.line += 1;
                        self.column = 0;
                        self.pending_newline = false;
                    }
                    self.column += 1;
                    if buf[0] == b'\n' {
                        self.pending_newline = true;
                    }
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Line of the most recently returned byte (1-based).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Column of the most recently returned byte (1-based).
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Hands the underlying reader back to the caller.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
