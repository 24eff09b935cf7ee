//! Shift/reduce construction of the expression tree.
//!
//! The pending-application stack is threaded through the `Ap` cells
//! themselves: a pending node's `l` is the empty-slot marker and its `r`
//! links to the next pending node. An arriving atom fills the top node's
//! `l`; once a node has both children it becomes a completed subtree and is
//! itself the atom for the node below. Parsing terminates when the stack
//! runs empty.
//!
//! Every node is allocated in the old generation: the tree outlives any
//! number of collections, and no collection can run while the stack links
//! still live inside the half-built cells.

use crate::error::{ParseError, Result};
use std::io::Read;
use ugc::{CellRef, Constants, Heap, Tag};
use unl_lex::{Lexer, Token};

/// Builds expression trees out of token streams.
pub struct Parser<'h> {
    heap: &'h mut Heap,
    consts: Constants,
}

impl<'h> Parser<'h> {
    /// Creates a parser allocating into `heap`, handing out the shared
    /// combinators from `consts`.
    pub fn new(heap: &'h mut Heap, consts: Constants) -> Self {
        Self { heap, consts }
    }

    /// Parses one complete program, consuming exactly its tokens.
    pub fn parse<R: Read>(&mut self, lexer: &mut Lexer<R>) -> Result<CellRef> {
        // top of the pending-application stack, linked through `r`
        let mut pending = CellRef::NIL;
        loop {
            let mut expr = match lexer.next_token()? {
                Token::Eof => {
                    return Err(if pending.is_nil() {
                        ParseError::EmptyProgram
                    } else {
                        ParseError::UnexpectedEof
                    });
                }
                Token::Apply => {
                    pending = self
                        .heap
                        .alloc_old(Tag::Ap, 0, CellRef::NIL, pending)?;
                    continue;
                }
                Token::I => self.consts.i,
                Token::K => self.consts.k,
                Token::S => self.consts.s,
                Token::V => self.consts.v,
                Token::D => self.consts.d,
                Token::C => self.consts.c,
                Token::E => self.consts.e,
                Token::Read => self.consts.at,
                Token::Reprint => self.consts.pipe,
                Token::Print(byte) => {
                    self.heap
                        .alloc_old(Tag::Dot, byte, CellRef::NIL, CellRef::NIL)?
                }
                Token::Compare(byte) => {
                    self.heap
                        .alloc_old(Tag::Ques, byte, CellRef::NIL, CellRef::NIL)?
                }
            };

            // reduce: fill slots upward until a node still wants its operand
            loop {
                if pending.is_nil() {
                    return Ok(expr);
                }
                if self.heap.get(pending).l.is_nil() {
                    self.heap.set_left(pending, expr);
                    break;
                }
                let done = pending;
                pending = self.heap.get(done).r;
                self.heap.set_right(done, expr);
                expr = done;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugc::GcConfig;

    fn parse(src: &[u8]) -> (Heap, CellRef) {
        let mut heap = Heap::new(GcConfig::default()).unwrap();
        let consts = Constants::intern(&mut heap).unwrap();
        let mut lexer = Lexer::new(src);
        let root = Parser::new(&mut heap, consts)
            .parse(&mut lexer)
            .unwrap();
        (heap, root)
    }

    fn parse_err(src: &[u8]) -> ParseError {
        let mut heap = Heap::new(GcConfig::default()).unwrap();
        let consts = Constants::intern(&mut heap).unwrap();
        let mut lexer = Lexer::new(src);
        Parser::new(&mut heap, consts)
            .parse(&mut lexer)
            .unwrap_err()
    }

    #[test]
    fn test_single_atom() {
        let (heap, root) = parse(b"i");
        assert_eq!(heap.tag(root), Tag::I);
    }

    #[test]
    fn test_simple_application() {
        let (heap, root) = parse(b"`sk");
        let cell = heap.get(root);
        assert_eq!(cell.tag, Tag::Ap);
        assert_eq!(heap.tag(cell.l), Tag::S);
        assert_eq!(heap.tag(cell.r), Tag::K);
    }

    #[test]
    fn test_left_nested_application() {
        // ``ski = ((s k) i)
        let (heap, root) = parse(b"``ski");
        let outer = heap.get(root);
        assert_eq!(outer.tag, Tag::Ap);
        assert_eq!(heap.tag(outer.r), Tag::I);
        let inner = heap.get(outer.l);
        assert_eq!(inner.tag, Tag::Ap);
        assert_eq!(heap.tag(inner.l), Tag::S);
        assert_eq!(heap.tag(inner.r), Tag::K);
    }

    #[test]
    fn test_right_nested_application() {
        // `s`ki = (s (k i))
        let (heap, root) = parse(b"`s`ki");
        let outer = heap.get(root);
        assert_eq!(heap.tag(outer.l), Tag::S);
        let inner = heap.get(outer.r);
        assert_eq!(inner.tag, Tag::Ap);
        assert_eq!(heap.tag(inner.l), Tag::K);
        assert_eq!(heap.tag(inner.r), Tag::I);
    }

    #[test]
    fn test_shared_combinators_are_deduplicated() {
        let (heap, root) = parse(b"`ii");
        let cell = heap.get(root);
        assert_eq!(cell.l, cell.r);
    }

    #[test]
    fn test_fresh_cells_for_print_atoms() {
        let (heap, root) = parse(b"`.a.a");
        let cell = heap.get(root);
        assert_ne!(cell.l, cell.r);
        assert_eq!(heap.get(cell.l).ch, b'a');
        assert_eq!(heap.get(cell.r).ch, b'a');
    }

    #[test]
    fn test_r_parses_as_newline_print() {
        let (heap, root) = parse(b"r");
        let cell = heap.get(root);
        assert_eq!(cell.tag, Tag::Dot);
        assert_eq!(cell.ch, b'\n');
    }

    #[test]
    fn test_tree_lands_in_old_generation() {
        let (heap, root) = parse(b"``s`kii");
        assert!(heap.get(root).age > heap.config().age_max);
    }

    #[test]
    fn test_parse_stops_at_program_end() {
        let mut heap = Heap::new(GcConfig::default()).unwrap();
        let consts = Constants::intern(&mut heap).unwrap();
        let mut lexer = Lexer::new(&b"`ik`sk"[..]);
        let root = Parser::new(&mut heap, consts).parse(&mut lexer).unwrap();
        assert_eq!(heap.tag(root), Tag::Ap);
        // the second expression is still unread
        assert_eq!(lexer.next_token().unwrap(), Token::Apply);
    }

    #[test]
    fn test_empty_program_is_fatal() {
        assert!(matches!(parse_err(b"  # nothing\n"), ParseError::EmptyProgram));
    }

    #[test]
    fn test_premature_eof_is_fatal() {
        assert!(matches!(parse_err(b"``sk"), ParseError::UnexpectedEof));
        assert!(matches!(parse_err(b"`"), ParseError::UnexpectedEof));
    }

    #[test]
    fn test_lex_errors_propagate() {
        assert!(matches!(parse_err(b"`ix"), ParseError::Lex(_)));
    }
}
