//! Whole-program behavior of the evaluator.
//!
//! Programs are parsed from surface syntax and run against in-memory I/O
//! streams. The suite pins the combinator laws, the soundness of the
//! partial-application rewrites (side effects included), lazy `d`,
//! first-class continuations, `e`, the byte-oriented input operators, and
//! the transparency of the collector.

use ugc::{Constants, GcConfig, Heap, Tag};
use unl_eval::{EvalError, Machine};
use unl_lex::Lexer;
use unl_par::Parser;

/// Runs `src` with `input` on stdin; returns (result tag, output bytes).
fn run_with(
    config: GcConfig,
    src: &[u8],
    input: &[u8],
) -> (Result<Tag, EvalError>, Vec<u8>) {
    let mut heap = Heap::new(config).expect("config");
    let consts = Constants::intern(&mut heap).expect("constants");
    let mut lexer = Lexer::new(src);
    let program = Parser::new(&mut heap, consts)
        .parse(&mut lexer)
        .expect("parse");
    let mut out = Vec::new();
    let result = {
        let mut machine = Machine::new(&mut heap, consts, input, &mut out);
        machine.run(program)
    };
    (result.map(|r| heap.tag(r)), out)
}

fn run(src: &[u8], input: &[u8]) -> Vec<u8> {
    let (result, out) = run_with(GcConfig::default(), src, input);
    result.expect("evaluation");
    out
}

// ---------------------------------------------------------------------------
// Combinator laws
// ---------------------------------------------------------------------------

#[test]
fn test_i_is_identity() {
    // ((i .A) i): i returns .A unchanged, which then prints
    assert_eq!(run(b"``i.Ai", b""), b"A");
}

#[test]
fn test_k_discards_its_second_argument() {
    // ((k .A) .B) i keeps .A; .B must never print
    assert_eq!(run(b"```k.A.Bi", b""), b"A");
}

#[test]
fn test_s_distributes_and_orders_effects() {
    // s f g x = (f x)(g x); f x runs before g x
    assert_eq!(run(b"```s.A.Bi", b""), b"AB");
}

#[test]
fn test_v_absorbs_everything() {
    assert_eq!(run(b"```v.A.Bv", b""), b"");
}

// ---------------------------------------------------------------------------
// Rewrite soundness: the compact combinators behave exactly like the
// shapes they replace, side effects included
// ---------------------------------------------------------------------------

#[test]
fn test_b_rewrite_matches_direct_composition() {
    // ``s`k.A rewrites toward B; B .A .B x = .A (.B x)
    assert_eq!(run(b"```s`k.A.Bi", b""), b"BA");
    assert_eq!(run(b"`.A`.Bi", b""), b"BA");
}

#[test]
fn test_c_rewrite_matches_substitution() {
    // ``s.A`k.B rewrites toward C; C .A .B x = (.A x) .B
    assert_eq!(run(b"```s.A`k.Bi", b""), b"A");
}

#[test]
fn test_t_rewrite_swaps_argument_order() {
    // ``si`k.A rewrites toward T; T .A y = y .A
    assert_eq!(run(b"```si`k.A.B", b""), b"B");
}

#[test]
fn test_v2_rewrite_applies_in_order() {
    // ``s``si`k.A`k.B rewrites toward V; V .A .B z = (z .A) .B
    assert_eq!(run(b"```s``si`k.A`k.B.C", b""), b"CA");
}

// ---------------------------------------------------------------------------
// Lazy d
// ---------------------------------------------------------------------------

#[test]
fn test_d_freezes_its_operand() {
    // the delayed `ri is never forced; nothing prints
    assert_eq!(run(b"`d`ri", b""), b"");
    assert_eq!(run(b"`d`.Xi", b""), b"");
}

#[test]
fn test_applying_a_delay_forces_it() {
    // ((d i) (r i)): the operand runs, then i is forced and applied
    assert_eq!(run(b"``di`ri", b""), b"\n");
}

#[test]
fn test_b_with_d_short_circuit_stays_lazy() {
    // (s (k d)) g x must behave as d (g x): frozen, no print
    assert_eq!(run(b"```s`kd.Gi", b""), b"");
    assert_eq!(run(b"`d`.Gi", b""), b"");
    // forcing the frozen application finally prints
    assert_eq!(run(b"````s`kd.Gii", b""), b"G");
}

// ---------------------------------------------------------------------------
// Continuations and exit
// ---------------------------------------------------------------------------

#[test]
fn test_continuation_capture_terminates() {
    assert_eq!(run(b"`ci", b""), b"");
}

#[test]
fn test_unused_continuation_returns_to_context() {
    // the captured continuation flows into .X as an ordinary value
    assert_eq!(run(b"`.X`ci", b""), b"X");
}

#[test]
fn test_invoking_a_continuation_reenters_its_context() {
    // ((.H (c i)) i): the context prints H once on capture and once more
    // when the continuation is invoked with i
    assert_eq!(run(b"``.H`cii", b""), b"HH");
}

#[test]
fn test_exit_discards_the_rest_of_the_program() {
    let (result, out) = run_with(GcConfig::default(), b"`.A`ev", b"");
    assert_eq!(out, b"");
    assert_eq!(result.unwrap(), Tag::V);
}

#[test]
fn test_exit_reports_its_argument() {
    let (result, out) = run_with(GcConfig::default(), b"`ek", b"");
    assert_eq!(out, b"");
    assert_eq!(result.unwrap(), Tag::K);
}

// ---------------------------------------------------------------------------
// Byte I/O
// ---------------------------------------------------------------------------

#[test]
fn test_echo_one_byte() {
    // read a byte, then reprint it through |
    assert_eq!(run(b"``@i``|iv", b"Q"), b"Q");
}

#[test]
fn test_echo_at_end_of_input_prints_nothing() {
    assert_eq!(run(b"``@i``|iv", b""), b"");
}

#[test]
fn test_compare_matches_current_byte() {
    assert_eq!(run(b"``@i```?Qi.Ai", b"Q"), b"A");
    assert_eq!(run(b"``@i```?Qi.Ai", b"X"), b"");
}

#[test]
fn test_compare_before_any_read_sees_end_of_input() {
    // nothing has been read; ?a must not match anything
    assert_eq!(run(b"```?ai.Ai", b"aaa"), b"");
}

#[test]
fn test_io_is_byte_oriented() {
    // raw 0xff passes through printing and comparison untouched
    assert_eq!(run(&[b'`', b'.', 0xff, b'i'], b""), vec![0xff]);
    let mut src = b"``@i```?".to_vec();
    src.push(0xff);
    src.extend_from_slice(b"i.Ai");
    assert_eq!(run(&src, &[0xff]), b"A");
}

#[test]
fn test_print_returns_its_operand() {
    // ((.H .e) i) prints H then e, left to right
    assert_eq!(run(b"``.H.ei", b""), b"He");
}

// ---------------------------------------------------------------------------
// GC transparency
// ---------------------------------------------------------------------------

/// Programs with observable output, re-run under hostile GC settings.
const OBSERVABLE: &[(&[u8], &[u8], &[u8])] = &[
    (b"``i.Ai", b"", b"A"),
    (b"```s.A.Bi", b"", b"AB"),
    (b"```s`k.A.Bi", b"", b"BA"),
    (b"```s``si`k.A`k.B.C", b"", b"CA"),
    (b"``di`ri", b"", b"\n"),
    (b"``.H`cii", b"", b"HH"),
    (b"``@i``|iv", b"Q", b"Q"),
    (b"``@i```?Qi.Ai", b"Q", b"A"),
];

#[test]
fn test_collections_do_not_change_output() {
    for (src, input, expected) in OBSERVABLE {
        // collect at every safepoint
        let stress = GcConfig {
            young_size: 64,
            heap_chunk_size: 64,
            stress: true,
            ..Default::default()
        };
        let (result, out) = run_with(stress, src, input);
        result.expect("stressed evaluation");
        assert_eq!(&out, expected, "stress output for {:?}", src);

        // tiny nursery: collections triggered by exhaustion instead
        let tiny = GcConfig {
            young_size: 16,
            heap_chunk_size: 64,
            ..Default::default()
        };
        let (result, out) = run_with(tiny, src, input);
        result.expect("tiny-nursery evaluation");
        assert_eq!(&out, expected, "tiny-nursery output for {:?}", src);
    }
}

#[test]
fn test_deep_spine_survives_promotion() {
    // 500 nested prints force frames through aging and promotion
    let mut src = Vec::new();
    for _ in 0..500 {
        src.extend_from_slice(b"`.A");
    }
    src.push(b'i');
    let config = GcConfig {
        young_size: 32,
        heap_chunk_size: 256,
        ..Default::default()
    };
    let (result, out) = run_with(config, &src, b"");
    result.expect("deep evaluation");
    assert_eq!(out, vec![b'A'; 500]);
}

#[test]
fn test_runaway_program_hits_the_heap_cap() {
    // x (x x) grows without bound; the cap turns divergence into OOM
    let config = GcConfig {
        young_size: 256,
        heap_chunk_size: 256,
        max_old_cells: Some(2048),
        ..Default::default()
    };
    let (result, out) = run_with(config, b"```s`sii``s`sii", b"");
    assert_eq!(out, b"");
    match result {
        Err(EvalError::Heap(err)) => {
            assert!(err.to_string().contains("out of memory"));
        }
        other => panic!("expected heap exhaustion, got {other:?}"),
    }
}
