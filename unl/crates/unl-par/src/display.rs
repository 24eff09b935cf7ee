//! Re-serialization and structural comparison of expression trees.
//!
//! Both walks are iterative: program trees can be arbitrarily deep in
//! either direction, so neither function recurses.

use ugc::{Arity, CellRef, Heap, Tag};

/// Serializes a parsed program back to surface syntax.
///
/// The output is canonical: no whitespace or comments, lower-case letters,
/// and a newline print appears as `r`. Parsing the result yields a tree
/// structurally identical to the input tree.
pub fn write_program(heap: &Heap, root: CellRef) -> Vec<u8> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(r) = stack.pop() {
        let cell = heap.get(r);
        match cell.tag {
            Tag::Ap => {
                out.push(b'`');
                stack.push(cell.r);
                stack.push(cell.l);
            }
            Tag::I => out.push(b'i'),
            Tag::K => out.push(b'k'),
            Tag::S => out.push(b's'),
            Tag::V => out.push(b'v'),
            Tag::D => out.push(b'd'),
            Tag::C => out.push(b'c'),
            Tag::E => out.push(b'e'),
            Tag::At => out.push(b'@'),
            Tag::Pipe => out.push(b'|'),
            Tag::Dot if cell.ch == b'\n' => out.push(b'r'),
            Tag::Dot => out.extend_from_slice(&[b'.', cell.ch]),
            Tag::Ques => out.extend_from_slice(&[b'?', cell.ch]),
            other => debug_assert!(false, "not a program cell: {other:?}"),
        }
    }
    out
}

/// Structural equality of two expression trees.
///
/// Shared subtrees short-circuit on reference equality; otherwise cells
/// compare by tag, payload and children.
pub fn trees_equal(heap: &Heap, a: CellRef, b: CellRef) -> bool {
    let mut stack = vec![(a, b)];
    while let Some((x, y)) = stack.pop() {
        if x == y {
            continue;
        }
        if x.is_nil() || y.is_nil() {
            return false;
        }
        let cx = heap.get(x);
        let cy = heap.get(y);
        if cx.tag != cy.tag || cx.ch != cy.ch {
            return false;
        }
        match cx.tag.arity() {
            Arity::Nullary => {}
            Arity::Unary => stack.push((cx.l, cy.l)),
            Arity::Binary => {
                stack.push((cx.l, cy.l));
                stack.push((cx.r, cy.r));
            }
        }
    }
    true
}
