use crate::reference::Ref;
use crate::utils::{pairing3, MyHash};

/// A node stored in the manager's arena.
///
/// Leaves have `variable == 0` and carry `value`; their branches point at the
/// leaf itself and are never followed. Decision nodes ignore `value`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub variable: u32,
    pub value: bool,
    pub high: Ref,
    pub low: Ref,
}

impl Node {
    pub const fn leaf(value: bool) -> Self {
        let this = Ref::leaf(value);
        Self {
            variable: 0,
            value,
            high: this,
            low: this,
        }
    }

    pub const fn decision(variable: u32, high: Ref, low: Ref) -> Self {
        Self {
            variable,
            value: false,
            high,
            low,
        }
    }

    pub const fn is_leaf(&self) -> bool {
        self.variable == 0
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::leaf(false)
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(
            self.variable as u64,
            self.high.get() as u64,
            self.low.get() as u64,
        )
    }
}
