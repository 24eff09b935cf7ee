//! The tokenizer.
//!
//! Whitespace separates tokens and `#` starts a comment running to the end
//! of the line. Letter combinators are case-insensitive. `.` and `?`
//! consume the very next byte as their payload, whatever it is - including
//! whitespace, `#`, or bytes outside ASCII.

use crate::cursor::Cursor;
use crate::error::{LexError, Result};
use crate::token::Token;
use std::io::Read;

/// Tokenizer over a byte stream.
pub struct Lexer<R> {
    cursor: Cursor<R>,
}

impl<R: Read> Lexer<R> {
    /// Creates a lexer over the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            cursor: Cursor::new(reader),
        }
    }

    /// Returns the next token, or `Token::Eof` at end of input.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let byte = match self.cursor.bump()? {
                Some(byte) => byte,
                None => return Ok(Token::Eof),
            };
            let token = match byte {
                b'`' => Token::Apply,
                b'i' | b'I' => Token::I,
                b'k' | b'K' => Token::K,
                b's' | b'S' => Token::S,
                b'v' | b'V' => Token::V,
                b'd' | b'D' => Token::D,
                b'c' | b'C' => Token::C,
                b'e' | b'E' => Token::E,
                b'r' | b'R' => Token::Print(b'\n'),
                b'@' => Token::Read,
                b'|' => Token::Reprint,
                b'.' => Token::Print(self.payload(b'.')?),
                b'?' => Token::Compare(self.payload(b'?')?),
                b'#' => {
                    self.skip_comment()?;
                    continue;
                }
                b if b.is_ascii_whitespace() || b == 0x0b => continue,
                other => {
                    return Err(LexError::UnknownByte {
                        byte: other,
                        line: self.cursor.line(),
                        column: self.cursor.column(),
                    })
                }
            };
            return Ok(token);
        }
    }

    /// Reads the raw payload byte of `.` or `?`.
    fn payload(&mut self, intro: u8) -> Result<u8> {
        match self.cursor.bump()? {
            Some(byte) => Ok(byte),
            None => Err(LexError::UnexpectedEof {
                intro: intro as char,
                line: self.cursor.line(),
                column: self.cursor.column(),
            }),
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        while let Some(byte) = self.cursor.bump()? {
            if byte == b'\n' {
                break;
            }
        }
        Ok(())
    }

    /// Consumes the rest of the current line, newline included.
    ///
    /// When the program arrives on standard input, the bytes after it on
    /// the program's final line are discarded before evaluation begins so
    /// that `@`, `?` and `|` see only the intended input stream.
    pub fn skip_line(&mut self) -> Result<()> {
        while let Some(byte) = self.cursor.bump()? {
            if byte == b'\n' {
                break;
            }
        }
        Ok(())
    }

    /// Hands the underlying reader back; the remaining bytes become the
    /// running program's input.
    pub fn into_reader(self) -> R {
        self.cursor.into_inner()
    }
}
