//! Current/next state variable tagging.
//!
//! Transition relations are diagrams over two copies of every state variable:
//! one for the current state and one for the next state. Each state variable
//! `k >= 1` owns two adjacent positions in the variable order:
//!
//! ```text
//! current(k) = 2k      (low bit clear)
//! next(k)    = 2k + 1  (low bit set)
//! ```
//!
//! so `x1 < x1' < x2 < x2' < ...`. Renaming current to next variables (and
//! back) is then monotone on diagrams over a single copy, and keeps the
//! ordering invariant intact.
//!
//! Id `0` is reserved for leaves and id `1` is never produced by the scheme.
//! Diagrams whose ids were not produced by [`Var`] can still be passed to
//! [`Bdd::next`][crate::bdd::Bdd::next] and [`Bdd::prev`][crate::bdd::Bdd::prev],
//! but the result has no meaning as a state set.

use std::fmt;

/// A diagram variable tagged as current- or next-state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// The current-state variable of state variable `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k == 0` or the id does not fit into `u32`.
    pub fn current(k: u32) -> Self {
        assert_ne!(k, 0, "State variables must be >= 1");
        assert!(k <= u32::MAX >> 1, "State variable {} is too large", k);
        Var(k << 1)
    }

    /// The next-state variable of state variable `k`.
    pub fn next(k: u32) -> Self {
        Var::current(k).to_next()
    }

    /// Wrap a raw diagram variable id.
    pub fn from_id(id: u32) -> Self {
        assert!(id >= 2, "Variable id {} is not a tagged state variable", id);
        Var(id)
    }

    /// Returns the raw diagram variable id.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Returns the state variable index `k`.
    pub fn state_index(self) -> u32 {
        self.0 >> 1
    }

    /// Checks if this is a next-state variable.
    pub fn is_next(self) -> bool {
        self.0 & 1 == 1
    }

    /// The next-state counterpart (identity on next-state variables).
    pub fn to_next(self) -> Self {
        Var(self.0 | 1)
    }

    /// The current-state counterpart (identity on current-state variables).
    pub fn to_current(self) -> Self {
        Var(self.0 & !1)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_next() {
            write!(f, "x{}'", self.state_index())
        } else {
            write!(f, "x{}", self.state_index())
        }
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// Map a raw id to its next-state id.
pub(crate) fn next_id(id: u32) -> u32 {
    id | 1
}

/// Map a raw id to its current-state id.
///
/// Id `1` has no current-state counterpart and is kept as is.
pub(crate) fn current_id(id: u32) -> u32 {
    if id == 1 {
        id
    } else {
        id & !1
    }
}
