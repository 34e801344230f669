//! # robdd: canonical binary decision diagrams
//!
//! **`robdd`** is a manager-centric library for **Reduced Ordered Binary
//! Decision Diagrams** aimed at symbolic model checking: boolean functions
//! stand for sets of states, and transition relations are diagrams over
//! current- and next-state copies of the state variables.
//!
//! ## Key Features
//!
//! - **Canonical form**: all nodes are created through the [`Bdd`][crate::bdd::Bdd]
//!   manager, which hash-conses them. Equal functions get equal [`Ref`][crate::reference::Ref]s.
//! - **Generic apply**: every binary connective is a 4-bit truth table ([`Op`][crate::op::Op])
//!   evaluated by one memoized algorithm.
//! - **State tagging**: [`Var`][crate::types::Var] interleaves current and next
//!   state variables, and [`Bdd::next`][crate::bdd::Bdd::next] / [`Bdd::prev`][crate::bdd::Bdd::prev]
//!   move diagrams between the two copies.
//! - **Detached diagrams**: [`RawBdd`][crate::raw::RawBdd] for diagrams built
//!   outside a manager, with reduction and compression passes.
//!
//! ## Basic Usage
//!
//! ```rust
//! use robdd::bdd::Bdd;
//! use robdd::reference::Ref;
//!
//! let bdd = Bdd::default();
//!
//! let p = bdd.mk_node(2, Ref::TRUE, Ref::FALSE); // x2
//! let q = bdd.mk_node(2, Ref::FALSE, Ref::TRUE); // ¬x2
//!
//! assert_eq!(bdd.apply_or(p, q), Ref::TRUE);
//! assert_eq!(bdd.apply_and(p, q), Ref::FALSE);
//! assert_eq!(bdd.apply_xor(p, q), Ref::TRUE);
//! assert_eq!(bdd.apply_eq(p, q), Ref::FALSE);
//! ```
//!
//! ## Transition relations
//!
//! ```rust
//! use robdd::bdd::Bdd;
//! use robdd::types::Var;
//!
//! let bdd = Bdd::default();
//! let x = Var::current(1).id();
//! let x_next = Var::next(1).id();
//!
//! // A toggle: x' = ¬x
//! let toggle = bdd.apply_xor(bdd.mk_var(x), bdd.mk_var(x_next));
//!
//! // Successors of {x = 0}
//! let from = bdd.mk_nvar(x);
//! let image = bdd.prev(bdd.exists(bdd.apply_and(from, toggle), x));
//! assert_eq!(image, bdd.mk_var(x));
//! ```

pub mod bdd;
pub mod cache;
pub mod node;
pub mod op;
pub mod raw;
pub mod reference;
pub mod table;
pub mod types;
pub mod utils;
