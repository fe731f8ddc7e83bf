//! Identity Tests - ids, hashes and pointer equality across copies
//!
//! An object's identity must not change when it is localized, promoted or
//! evacuated.

mod common;

use common::*;
use stmgc::{latest_revision, mangle, normalize_global, ptr_eq};

// ============================================================================
// IDENTITY
// ============================================================================

/// **Bug this finds:** Global identity not its address
#[test]
fn test_id_of_global() {
    let fx = StmFixture::new();
    let s = fx.global(S);
    let thread = fx.worker();

    assert_eq!(thread.identity(s).unwrap(), s);
    assert_eq!(thread.identity_hash(s).unwrap(), mangle(s));
    assert_eq!(thread.identity(0).unwrap(), 0);
}

/// **Bug this finds:** Local copy reporting its own address
#[test]
fn test_id_of_globallocal() {
    let fx = StmFixture::new();
    let s = fx.global(S);
    let mut thread = fx.worker();

    let t = thread.write_barrier(s).unwrap();
    assert_ne!(t, s);
    let i = thread.identity(t).unwrap();
    assert_eq!(i, s);
    assert_eq!(i, thread.identity(s).unwrap());
    assert_eq!(thread.identity_hash(t).unwrap(), mangle(s));

    thread.stop_transaction().unwrap();
    assert_eq!(thread.identity(s).unwrap(), i);
    assert_eq!(thread.identity(latest_revision(s)).unwrap(), i);
    assert_eq!(thread.identity_hash(latest_revision(s)).unwrap(), mangle(i));
}

/// Identity survives several generations of promotion
///
/// **Bug this finds:** Promotion storing the previous revision's address
#[test]
fn test_id_over_many_revisions() {
    let fx = StmFixture::new();
    let s = fx.global(S);
    let mut thread = fx.worker();

    for round in 0..5 {
        let t = thread.write_barrier(s).unwrap();
        set(t, OFS_A, round);
        assert_eq!(thread.identity(t).unwrap(), s);
        thread.commit_transaction().unwrap();
    }

    let latest = latest_revision(s);
    assert_eq!(get(latest, OFS_A), 4);
    assert_eq!(thread.identity(latest).unwrap(), s);
}

/// **Bug this finds:** Fresh identity unstable or equal to a nursery address
#[test]
fn test_id_of_local_nonsurviving() {
    let fx = StmFixture::new();
    let mut thread = fx.worker();
    let s = thread.allocate_object(S).unwrap();

    let i = thread.identity(s).unwrap();
    assert_ne!(i, s);
    assert_eq!(i, thread.identity(s).unwrap());
    assert!(fx.gc.global_space().contains(i));

    let other = thread.allocate_object(S).unwrap();
    assert_ne!(thread.identity(other).unwrap(), i);
    thread.stop_transaction().unwrap();
}

/// **Bug this finds:** Fresh identity lost when the object is evacuated
#[test]
fn test_id_of_local_surviving() {
    let fx = StmFixture::new();
    let sr1 = fx.global(SR);
    assert_eq!(get(sr1, OFS_S1), 0);
    assert_eq!(get(sr1, OFS_SR2), 0);

    let mut thread = fx.worker();
    let t2 = thread.allocate_object(S).unwrap();
    set(t2, OFS_A, 423);
    let tr1 = thread.write_barrier(sr1).unwrap();
    assert_ne!(tr1, sr1);
    set(tr1, OFS_S1, t2);

    let i = thread.identity(t2).unwrap();
    assert!(![sr1, t2, tr1].contains(&i));
    assert_eq!(i, thread.identity(t2).unwrap());
    let h = thread.identity_hash(t2).unwrap();
    assert!(![mangle(sr1), mangle(tr1)].contains(&h));

    thread.stop_transaction().unwrap();

    let s2 = get(latest_revision(sr1), OFS_S1);
    assert!(s2 != 0 && s2 != t2);
    assert_eq!(get(s2, OFS_A), 423);
    assert_eq!(thread.identity(s2).unwrap(), i);
    assert_eq!(thread.identity_hash(s2).unwrap(), h);
}

// ============================================================================
// NORMALIZE / POINTER EQUALITY
// ============================================================================

#[test]
fn test_normalize_global_null() {
    assert_eq!(normalize_global(0), 0);
}

#[test]
fn test_normalize_global_already_global() {
    let fx = StmFixture::new();
    let sr1 = fx.global(SR);
    assert_eq!(normalize_global(sr1), sr1);
}

#[test]
fn test_normalize_global_purely_local() {
    let fx = StmFixture::new();
    let mut thread = fx.worker();
    let sr1 = thread.allocate_object(SR).unwrap();
    assert_eq!(normalize_global(sr1), sr1);
}

/// **Bug this finds:** Local copy not mapped back to its original
#[test]
fn test_normalize_global_local_copy() {
    let fx = StmFixture::new();
    let sr1 = fx.global(SR);
    let mut thread = fx.worker();

    let tr1 = thread.write_barrier(sr1).unwrap();
    assert_eq!(normalize_global(sr1), sr1);
    assert_eq!(normalize_global(tr1), sr1);
}

/// **Bug this finds:** Copy and original compared unequal
#[test]
fn test_ptr_eq() {
    let fx = StmFixture::new();
    let a = fx.global(S);
    let b = fx.global(S);
    let mut thread = fx.worker();

    let a_copy = thread.write_barrier(a).unwrap();
    assert!(ptr_eq(a, a_copy));
    assert!(ptr_eq(a_copy, a));
    assert!(!ptr_eq(a, b));
    assert!(!ptr_eq(a_copy, b));
    assert!(ptr_eq(0, 0));
    assert!(!ptr_eq(a, 0));

    let fresh = thread.allocate_object(S).unwrap();
    assert!(ptr_eq(fresh, fresh));
    assert!(!ptr_eq(fresh, a));
}
