//! unl-lex - Tokenizer for Unlambda program text
//!
//! The surface syntax is a stream of single significant bytes:
//! `` ` `` marks a prefix application, the letters `i k s v d c e`
//! (either case) name the built-in combinators, `r` abbreviates printing a
//! newline, `@` and `|` are the input operators, and `.`/`?` each consume
//! one raw payload byte. Whitespace separates tokens and `#` begins a
//! line comment.
//!
//! This crate organizes the tokenizer into:
//! - `cursor` - byte source with line/column tracking
//! - `token` - token kinds
//! - `lexer` - the tokenizer itself
//! - `error` - fatal tokenizing errors

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod token;

pub use error::{LexError, Result};
pub use lexer::Lexer;
pub use token::Token;
