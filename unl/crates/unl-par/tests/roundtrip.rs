//! Parse/serialize round-trip property.
//!
//! For any generated program text: parsing, serializing and re-parsing
//! yields a structurally identical tree, and the serialized form is a
//! fixed point of the round trip.

use proptest::prelude::*;
use ugc::{Constants, GcConfig, Heap};
use unl_lex::Lexer;
use unl_par::{trees_equal, write_program, Parser};

/// Atoms that are a single significant byte (upper case included).
const SIMPLE_ATOMS: &[&[u8]] = &[
    b"i", b"k", b"s", b"v", b"d", b"c", b"e", b"K", b"S", b"@", b"|", b"r",
];

/// Strategy producing valid program text, payload bytes included.
fn program() -> impl Strategy<Value = Vec<u8>> {
    let leaf = prop_oneof![
        proptest::sample::select(SIMPLE_ATOMS).prop_map(|atom| atom.to_vec()),
        any::<u8>().prop_map(|b| vec![b'.', b]),
        any::<u8>().prop_map(|b| vec![b'?', b]),
    ];
    leaf.prop_recursive(8, 128, 2, |inner| {
        (inner.clone(), inner).prop_map(|(f, g)| {
            let mut out = vec![b'`'];
            out.extend_from_slice(&f);
            out.extend_from_slice(&g);
            out
        })
    })
}

proptest! {
    #[test]
    fn round_trip_preserves_structure(src in program()) {
        let mut heap = Heap::new(GcConfig::default()).unwrap();
        let consts = Constants::intern(&mut heap).unwrap();

        let mut lexer = Lexer::new(&src[..]);
        let first = Parser::new(&mut heap, consts).parse(&mut lexer).unwrap();

        let text = write_program(&heap, first);
        let mut lexer = Lexer::new(&text[..]);
        let second = Parser::new(&mut heap, consts).parse(&mut lexer).unwrap();

        prop_assert!(trees_equal(&heap, first, second));
        prop_assert_eq!(text, write_program(&heap, second));
    }
}
