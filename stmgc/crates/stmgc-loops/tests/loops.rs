//! Loop Interpreter Tests - Plain and STM-backed runs must agree
//!
//! Every program is run twice: with plain registers and with registers
//! boxed in stmgc objects, committing and collecting along the way.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use stmgc::config::MIN_ARENA_SIZE;
use stmgc::{StmConfig, StmGc, StmThread, TypeRegistry};
use stmgc_loops::{register_types, LoopError, Program, ARGS};

const NESTED: &str = "
    0A9B
    {
      5C
      {
        ab+A
        c1-C
        c
      }
      b1-B
      b
    }
    ";

const EXAMPLES: &[(&str, [i64; ARGS], [i64; ARGS])] = &[
    ("1A2B3C4D5E", [0, 0, 0, 0, 0], [1, 2, 3, 4, 5]),
    ("1", [6, 7, 8, 9, 0], [6, 7, 8, 9, 0]),
    ("1a+A2b+B3c+C4d+D5e+E", [6, 7, 8, 9, 0], [7, 9, 11, 13, 5]),
    ("ea+Eeb+Eec+Eed+E", [6, 7, 8, 9, 0], [6, 7, 8, 9, 30]),
    ("0A9B{ab+Ab1-Bb}", [0, 0, 0, 0, 0], [45, 0, 0, 0, 0]),
    ("0A0C9B{b4<(a1+A)(c1+C)b1-Bb}", [0, 0, 0, 0, 0], [3, 0, 6, 0, 0]),
    ("0A9B{ab+Ab1-Bb0=(x)1}", [0, 0, 0, 0, 0], [45, 0, 0, 0, 0]),
    (NESTED, [0, 0, 0, 0, 0], [225, 0, 0, 0, 0]),
];

fn create_gc(config: StmConfig) -> Arc<StmGc> {
    let mut types = TypeRegistry::new();
    register_types(&mut types).unwrap();
    StmGc::emulated(config, types).unwrap()
}

fn worker(gc: &Arc<StmGc>) -> StmThread {
    let mut thread = gc.worker_thread().unwrap();
    thread.start_transaction().unwrap();
    thread
}

fn verifying() -> StmConfig {
    StmConfig {
        verify_invariants: true,
        ..Default::default()
    }
}

// ============================================================================
// Plain registers
// ============================================================================

/// **Bug this finds:** Wrong prev tracking, bad jump offsets
#[test]
fn test_examples_plain() {
    for (source, args, expected) in EXAMPLES {
        let program = Program::parse(source).unwrap();
        assert_eq!(program.run(*args).unwrap(), *expected, "{:?}", source);
    }
}

/// **Bug this finds:** Malformed programs accepted at parse time
#[test]
fn test_parse_errors() {
    assert!(matches!(
        Program::parse("1A#"),
        Err(LoopError::UnknownOpcode { op: '#', pc: 2 })
    ));
    assert!(matches!(
        Program::parse("{1}}"),
        Err(LoopError::UnbalancedBracket { bracket: '}', pc: 3 })
    ));
    assert!(matches!(
        Program::parse("({)}"),
        Err(LoopError::MismatchedBracket { .. })
    ));
    assert!(Program::parse("").unwrap().is_empty());
}

// ============================================================================
// STM-backed registers
// ============================================================================

/// **Bug this finds:** Register writes lost through the write barrier
#[test]
fn test_examples_stm() {
    let gc = create_gc(verifying());
    let mut thread = worker(&gc);

    for (source, args, expected) in EXAMPLES {
        let program = Program::parse(source).unwrap();
        assert_eq!(
            program.run_stm(&mut thread, *args).unwrap(),
            *expected,
            "{:?}",
            source
        );
        assert_eq!(thread.root_count(), 0);
        assert!(thread.in_transaction());
    }
}

/// **Bug this finds:** Frame or boxes lost across transaction boundaries
#[test]
fn test_small_check_interval() {
    let gc = create_gc(verifying());
    gc.thread_locals().set_check_interval(3).unwrap();
    let mut thread = worker(&gc);

    let program = Program::parse(NESTED).unwrap();
    assert_eq!(
        program.run_stm(&mut thread, [0; ARGS]).unwrap(),
        [225, 0, 0, 0, 0]
    );

    let stats = gc.stats().snapshot();
    assert!(stats.collections > 10);
    assert!(stats.copies_promoted > 0);
}

/// **Bug this finds:** Unrooted boxes dangling after a nursery recovery
#[test]
fn test_tiny_nursery() {
    let gc = create_gc(StmConfig {
        nursery_size: MIN_ARENA_SIZE,
        ..verifying()
    });
    let mut thread = worker(&gc);

    let program = Program::parse(NESTED).unwrap();
    assert_eq!(
        program.run_stm(&mut thread, [0; ARGS]).unwrap(),
        [225, 0, 0, 0, 0]
    );
    assert!(gc.stats().snapshot().nursery_recoveries > 0);
}

/// **Bug this finds:** Non-transactional runs touching the nursery
#[test]
fn test_main_thread_runs_global() {
    let gc = create_gc(verifying());
    let mut main = gc.main_thread().unwrap();

    let program = Program::parse("0A0C9B{b4<(a1+A)(c1+C)b1-Bb}").unwrap();
    assert_eq!(
        program.run_stm(&mut main, [0; ARGS]).unwrap(),
        [3, 0, 6, 0, 0]
    );
    assert_eq!(main.nursery().used(), 0);
    assert_eq!(gc.stats().snapshot().collections, 0);
}

/// **Bug this finds:** Root slots leaked when a run fails
#[test]
fn test_failed_run_pops_frame() {
    let gc = create_gc(verifying());
    let mut thread = worker(&gc);
    thread.push_root(0);

    let program = Program::parse("1Ax").unwrap();
    assert!(matches!(
        program.run_stm(&mut thread, [0; ARGS]),
        Err(LoopError::BreakOutsideLoop(2))
    ));
    assert_eq!(thread.root_count(), 1);
}

// ============================================================================
// Random programs
// ============================================================================

/// Random body that never stores to `d`, the loop counter
fn random_body(rng: &mut StdRng, len: usize, depth: usize) -> String {
    const OPS: &[u8] = b"0123456789abcdeABCE+-<>= ";
    let mut body = String::new();
    for _ in 0..len {
        if depth < 2 && rng.gen_ratio(1, 8) {
            let len = rng.gen_range(1..6);
            let inner = random_body(rng, len, depth + 1);
            body.push('(');
            body.push_str(&inner);
            body.push(')');
        } else {
            body.push(OPS[rng.gen_range(0..OPS.len())] as char);
        }
    }
    body
}

/// Loop counted down in `d`, with a random body
fn random_program(rng: &mut StdRng) -> String {
    let rounds = rng.gen_range(1..10);
    let len = rng.gen_range(5..25);
    let body = random_body(rng, len, 0);
    format!("{}D{{{}d1-Dd}}", rounds, body)
}

/// **Bug this finds:** Any divergence between boxed and plain registers
#[test]
fn test_random_programs() {
    let mut rng = StdRng::seed_from_u64(0x100F);
    let gc = create_gc(StmConfig {
        nursery_size: 4 * MIN_ARENA_SIZE,
        ..verifying()
    });
    gc.thread_locals().set_check_interval(17).unwrap();
    let mut thread = worker(&gc);

    for _ in 0..40 {
        let source = random_program(&mut rng);
        let program = Program::parse(&source).unwrap();
        let args: [i64; ARGS] = std::array::from_fn(|_| rng.gen_range(-20..20));

        let plain = program.run(args).unwrap();
        let boxed = program.run_stm(&mut thread, args).unwrap();
        assert_eq!(plain, boxed, "program {:?} with {:?}", source, args);
    }
}
