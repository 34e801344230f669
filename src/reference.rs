use std::fmt::{Display, Formatter};

/// A handle to a node in a [`Bdd`][crate::bdd::Bdd] manager.
///
/// A `Ref` is an index into the manager's node arena. Two references produced
/// by the same manager are equal iff they denote the same boolean function.
///
/// Index `0` is the arena sentry and never denotes a node.
/// The two leaves always live at fixed indices, so [`Ref::FALSE`] and
/// [`Ref::TRUE`] are valid in every manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(u32);

impl Ref {
    /// The `false` leaf.
    pub const FALSE: Ref = Ref(1);
    /// The `true` leaf.
    pub const TRUE: Ref = Ref(2);

    // Only the manager mints references, so a non-leaf `Ref` always points
    // at a node registered in the unique table.
    pub(crate) const fn new(index: u32) -> Self {
        assert!(index != 0, "Index 0 is reserved for the sentry");
        Self(index)
    }

    /// Return the leaf reference for the given boolean value.
    pub const fn leaf(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    /// Check whether this is one of the two leaves.
    pub const fn is_leaf(self) -> bool {
        self.0 == Self::FALSE.0 || self.0 == Self::TRUE.0
    }

    /// Return the index of the reference.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::FALSE => write!(f, "0"),
            Self::TRUE => write!(f, "1"),
            _ => write!(f, "@{}", self.0),
        }
    }
}
