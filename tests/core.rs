//! End-to-end tests for the diagram manager.
//!
//! Functions over a few variables are built from their truth tables, so every
//! result can be checked against plain boolean evaluation.

use std::collections::BTreeSet;

use robdd::bdd::Bdd;
use robdd::op::Op;
use robdd::raw::{CompressTable, RawBdd};
use robdd::reference::Ref;
use robdd::types::Var;
use test_log::test;

const NUM_VARS: u32 = 3;

/// Assignment number `a` sets variable `v` (1-based) to bit `v - 1` of `a`.
fn assignment(a: u32) -> impl Fn(u32) -> bool {
    move |v| (a >> (v - 1)) & 1 == 1
}

/// Build the function whose truth table over `NUM_VARS` variables is `table`.
fn from_table(bdd: &Bdd, table: u32) -> Ref {
    let minterms = (0..1 << NUM_VARS)
        .filter(|a| (table >> a) & 1 == 1)
        .map(|a| {
            bdd.apply_and_many((1..=NUM_VARS).map(|v| {
                if assignment(a)(v) {
                    bdd.mk_var(v)
                } else {
                    bdd.mk_nvar(v)
                }
            }))
        })
        .collect::<Vec<_>>();
    bdd.apply_or_many(minterms)
}

fn sample_tables() -> impl Iterator<Item = u32> {
    (0..256).step_by(17).chain([0b1001_0110, 0b1110_1000, 255])
}

/// Every decision node of `raw` has distinct branches.
fn is_reduced(raw: &RawBdd) -> bool {
    match (raw.high(), raw.low()) {
        (Some(high), Some(low)) => !high.equals(low) && is_reduced(high) && is_reduced(low),
        _ => true,
    }
}

// ─── Canonical Form ────────────────────────────────────────────────────────────

#[test]
fn canonical_descriptors() {
    let bdd = Bdd::default();

    let a = bdd.mk_node(2, Ref::TRUE, Ref::FALSE);
    let b = bdd.mk_node(1, a, Ref::TRUE);
    let size = bdd.num_nodes();

    assert_eq!(bdd.mk_node(2, Ref::TRUE, Ref::FALSE), a);
    assert_eq!(bdd.mk_node(1, a, Ref::TRUE), b);
    assert_eq!(bdd.num_nodes(), size);
}

#[test]
fn equal_functions_are_identical() {
    let bdd = Bdd::default();

    for table in sample_tables() {
        let f = from_table(&bdd, table);
        let size = bdd.num_nodes();
        // A different construction of the same function.
        let g = bdd.apply_not(bdd.apply_not(from_table(&bdd, table)));
        assert_eq!(f, g);
        assert!(bdd.equals(f, g));
        assert!(bdd.num_nodes() >= size);
    }
}

#[test]
fn diagrams_are_reduced() {
    let bdd = Bdd::default();

    for table in 0..256 {
        let f = from_table(&bdd, table);
        assert!(is_reduced(&bdd.export(f)), "table {:08b}", table);
    }
}

#[test]
fn distinct_functions_are_distinct() {
    let bdd = Bdd::default();

    let refs: BTreeSet<Ref> = (0..256).map(|t| from_table(&bdd, t)).collect();
    assert_eq!(refs.len(), 256);
}

// ─── Apply ─────────────────────────────────────────────────────────────────────

#[test]
fn apply_matches_truth_tables() {
    let bdd = Bdd::default();

    for table in 0..16 {
        let op = Op::new(table);
        for t1 in sample_tables() {
            for t2 in sample_tables() {
                let p = from_table(&bdd, t1);
                let q = from_table(&bdd, t2);
                let r = bdd.apply(op, p, q);
                for a in 0..1 << NUM_VARS {
                    let expected = op.eval(
                        bdd.evaluate(p, assignment(a)),
                        bdd.evaluate(q, assignment(a)),
                    );
                    assert_eq!(
                        bdd.evaluate(r, assignment(a)),
                        expected,
                        "{} on {:08b}, {:08b} at {:03b}",
                        op,
                        t1,
                        t2,
                        a
                    );
                }
            }
        }
    }
}

#[test]
fn apply_on_leaves() {
    let bdd = Bdd::default();

    for table in 0..16 {
        let op = Op::new(table);
        for a in [false, true] {
            for b in [false, true] {
                let r = bdd.apply(op, bdd.leaf(a), bdd.leaf(b));
                assert_eq!(r, Ref::leaf(op.eval(a, b)));
            }
        }
    }
    assert_eq!(bdd.num_nodes(), 2);
}

#[test]
fn derived_operators() {
    let bdd = Bdd::default();

    let x = bdd.mk_node(1, Ref::TRUE, Ref::FALSE);
    assert_eq!(bdd.apply_and(x, x), x);
    assert_eq!(bdd.apply_or(x, bdd.apply_not(x)), Ref::TRUE);
    assert_eq!(bdd.apply_xor(x, x), Ref::FALSE);
    assert_eq!(bdd.apply_eq(x, x), Ref::TRUE);
    assert_eq!(bdd.apply_imply(x, x), Ref::TRUE);
    assert_eq!(bdd.apply_not(x), bdd.apply_imply(x, Ref::FALSE));
}

#[test]
fn end_to_end_scenario() {
    let bdd = Bdd::default();

    let p = bdd.mk_node(2, Ref::TRUE, Ref::FALSE); // x2
    let q = bdd.mk_node(2, Ref::FALSE, Ref::TRUE); // ¬x2

    assert_eq!(bdd.apply_or(p, q), Ref::TRUE);
    assert_eq!(bdd.apply_and(p, q), Ref::FALSE);
    assert_eq!(bdd.apply_xor(p, q), Ref::TRUE);
    assert_eq!(bdd.apply_eq(p, q), Ref::FALSE);
}

// ─── Restriction & Quantification ──────────────────────────────────────────────

#[test]
fn restriction_law() {
    let bdd = Bdd::default();

    for table in sample_tables() {
        let f = from_table(&bdd, table);
        for v in 1..=NUM_VARS {
            let f1 = bdd.set(f, v, true);
            let f0 = bdd.set(f, v, false);
            assert!(!bdd.support(f1).contains(&v));
            assert!(!bdd.support(f0).contains(&v));

            let e = bdd.exists(f, v);
            assert_eq!(e, bdd.apply_or(f1, f0));

            for a in 0..1 << NUM_VARS {
                // f|v<-b agrees with f on assignments where v = b.
                let b = assignment(a)(v);
                let restricted = if b { f1 } else { f0 };
                assert_eq!(
                    bdd.evaluate(restricted, assignment(a)),
                    bdd.evaluate(f, assignment(a))
                );
                // Every model of f is a model of ∃v. f.
                if bdd.evaluate(f, assignment(a)) {
                    assert!(bdd.evaluate(e, assignment(a)));
                }
            }
        }
    }
}

#[test]
fn quantification_duality() {
    let bdd = Bdd::default();

    for table in sample_tables() {
        let f = from_table(&bdd, table);
        for v in 1..=NUM_VARS {
            let lhs = bdd.forall(f, v);
            let rhs = bdd.apply_not(bdd.exists(bdd.apply_not(f), v));
            assert_eq!(lhs, rhs);
            assert!(bdd.contains(bdd.exists(f, v), f));
            assert!(bdd.contains(f, bdd.forall(f, v)));
        }
    }
}

// ─── State Tagging ─────────────────────────────────────────────────────────────

/// The same truth table over current-state variables `x1..x3`.
fn from_table_current(bdd: &Bdd, table: u32) -> Ref {
    let f = from_table(bdd, table);
    // Renaming v to Var::current(v) is monotone, so the order is kept.
    let raw = bdd.export(f);
    fn rename(raw: &RawBdd) -> RawBdd {
        match (raw.high(), raw.low()) {
            (Some(high), Some(low)) => {
                RawBdd::node(Var::current(raw.variable()).id(), rename(high), rename(low))
            }
            _ => raw.clone(),
        }
    }
    bdd.import(&rename(&raw))
}

#[test]
fn next_prev_inverse() {
    let bdd = Bdd::default();

    for table in 0..256 {
        let f = from_table_current(&bdd, table);
        let g = bdd.next(f);
        assert!(bdd.support(g).iter().all(|&v| Var::from_id(v).is_next()));
        assert!(bdd.equals(bdd.prev(g), f));
        assert_eq!(bdd.prev(g), f);
    }
}

#[test]
fn next_renames_pointwise() {
    let bdd = Bdd::default();

    for table in sample_tables() {
        let f = from_table_current(&bdd, table);
        let g = bdd.next(f);
        for a in 0..1 << NUM_VARS {
            let current = |v: u32| assignment(a)(Var::from_id(v).state_index());
            assert_eq!(bdd.evaluate(f, current), bdd.evaluate(g, current));
        }
    }
}

#[test]
fn image_of_a_counter() {
    let bdd = Bdd::default();

    // Two-bit counter: (b1, b0) -> (b1, b0) + 1 mod 4
    let b0 = Var::current(1).id();
    let b1 = Var::current(2).id();
    let b0n = Var::next(1).id();
    let b1n = Var::next(2).id();
    let trans = bdd.apply_and(
        bdd.apply_xor(bdd.mk_var(b0n), bdd.mk_var(b0)),
        bdd.apply_eq(
            bdd.mk_var(b1n),
            bdd.apply_xor(bdd.mk_var(b1), bdd.mk_var(b0)),
        ),
    );

    let zero = bdd.apply_and(bdd.mk_nvar(b0), bdd.mk_nvar(b1));
    let image = |from: Ref| bdd.prev(bdd.exists_many(bdd.apply_and(from, trans), [b0, b1]));

    let one = image(zero);
    assert_eq!(one, bdd.apply_and(bdd.mk_var(b0), bdd.mk_nvar(b1)));
    let two = image(one);
    assert_eq!(two, bdd.apply_and(bdd.mk_nvar(b0), bdd.mk_var(b1)));
    let four = image(image(two));
    assert_eq!(four, zero);

    // Preimage goes back.
    let preimage = |to: Ref| bdd.exists_many(bdd.apply_and(trans, bdd.next(to)), [b0n, b1n]);
    assert_eq!(preimage(one), zero);
}

// ─── Containment & Intersection ────────────────────────────────────────────────

#[test]
fn containment_and_intersection() {
    let bdd = Bdd::default();

    for t1 in sample_tables() {
        for t2 in sample_tables() {
            let p = from_table(&bdd, t1);
            let q = from_table(&bdd, t2);

            let contains = bdd.contains(p, q);
            assert_eq!(contains, bdd.is_false(bdd.apply_and(q, bdd.apply_not(p))));
            assert_eq!(contains, t2 & !t1 == 0);

            let intersects = bdd.intersects(p, q);
            assert_eq!(intersects, !bdd.is_false(bdd.apply_and(p, q)));
            assert_eq!(intersects, t1 & t2 != 0);

            assert!(bdd.contains(Ref::TRUE, q));
            assert!(!bdd.intersects(Ref::FALSE, q));
        }
    }
}

// ─── Reduce & Compress ─────────────────────────────────────────────────────────

#[test]
fn reduce_is_idempotent() {
    let bdd = Bdd::default();

    for table in sample_tables() {
        let f = from_table(&bdd, table);
        assert!(bdd.equals(bdd.reduce(f), f));

        let raw = bdd.export(f);
        assert!(raw.reduce().ptr_eq(&raw));
    }
}

#[test]
fn compress_after_reload() {
    let bdd = Bdd::default();
    let mut table = CompressTable::new();

    let f = from_table(&bdd, 0b1001_0110);
    let g = from_table(&bdd, 0b1110_1000);

    // Two independently exported copies share nothing.
    let a = bdd.export(f);
    let b = bdd.export(g);

    let a1 = a.compress(&mut table);
    let b1 = b.compress(&mut table);
    let a2 = a1.compress(&mut table);
    assert!(a2.ptr_eq(&a1));
    assert!(a1.equals(&a));
    assert!(b1.equals(&b));

    let other = Bdd::default();
    let h = other.import(&a1);
    assert_eq!(other.export(h).to_string(), a.to_string());
}
