//! Detached diagrams.
//!
//! A [`RawBdd`] is a reference-counted diagram that lives outside any
//! [`Bdd`] manager: nodes are created with [`RawBdd::node`] without any
//! hash-consing, so a raw diagram may contain redundant tests and duplicate
//! subtrees, and need not respect the variable order. This is the shape of
//! diagrams rebuilt from an external representation or assembled by hand.
//!
//! [`RawBdd::reduce`] and [`RawBdd::compress`] restore reducedness and
//! sharing on such diagrams; [`Bdd::import`] canonicalizes them into a
//! manager, and [`Bdd::export`] detaches a manager diagram.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use log::debug;

use crate::bdd::Bdd;
use crate::reference::Ref;

#[derive(Debug)]
enum RawNode {
    Leaf(bool),
    Node {
        variable: u32,
        high: RawBdd,
        low: RawBdd,
    },
}

/// A shared handle to a detached diagram node.
#[derive(Debug, Clone)]
pub struct RawBdd(Rc<RawNode>);

/// Identity of a raw node: its variable (or leaf value) and the identities of
/// its branches.
///
/// Two nodes with equal descriptors are structurally equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Descriptor {
    variable: u32,
    value: bool,
    high: usize,
    low: usize,
}

/// Lookup table used by [`RawBdd::compress`].
pub type CompressTable = HashMap<Descriptor, RawBdd>;

impl RawBdd {
    pub fn leaf(value: bool) -> Self {
        RawBdd(Rc::new(RawNode::Leaf(value)))
    }

    /// Create a decision node. No reduction or sharing is applied.
    ///
    /// # Panics
    ///
    /// Panics if `variable == 0`.
    pub fn node(variable: u32, high: RawBdd, low: RawBdd) -> Self {
        assert_ne!(variable, 0, "Variable index should not be zero");
        RawBdd(Rc::new(RawNode::Node {
            variable,
            high,
            low,
        }))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(*self.0, RawNode::Leaf(_))
    }

    /// Variable of the node, `0` for leaves.
    pub fn variable(&self) -> u32 {
        match *self.0 {
            RawNode::Leaf(_) => 0,
            RawNode::Node { variable, .. } => variable,
        }
    }

    /// Value of a leaf, `None` for decision nodes.
    pub fn value(&self) -> Option<bool> {
        match *self.0 {
            RawNode::Leaf(value) => Some(value),
            RawNode::Node { .. } => None,
        }
    }

    pub fn high(&self) -> Option<&RawBdd> {
        match &*self.0 {
            RawNode::Leaf(_) => None,
            RawNode::Node { high, .. } => Some(high),
        }
    }

    pub fn low(&self) -> Option<&RawBdd> {
        match &*self.0 {
            RawNode::Leaf(_) => None,
            RawNode::Node { low, .. } => Some(low),
        }
    }

    /// Check whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &RawBdd) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn descriptor(&self) -> Descriptor {
        match &*self.0 {
            RawNode::Leaf(value) => Descriptor {
                variable: 0,
                value: *value,
                high: 0,
                low: 0,
            },
            RawNode::Node {
                variable,
                high,
                low,
            } => Descriptor {
                variable: *variable,
                value: false,
                high: high.addr(),
                low: low.addr(),
            },
        }
    }

    /// Structural equality.
    ///
    /// Identical instances compare equal immediately; otherwise the variables
    /// (or leaf values) and both branches are compared recursively.
    pub fn equals(&self, other: &RawBdd) -> bool {
        let mut visited = HashSet::new();
        self.equals_(other, &mut visited)
    }

    fn equals_(&self, other: &RawBdd, visited: &mut HashSet<(usize, usize)>) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if !visited.insert((self.addr(), other.addr())) {
            return true;
        }
        match (&*self.0, &*other.0) {
            (RawNode::Leaf(a), RawNode::Leaf(b)) => a == b,
            (
                RawNode::Node {
                    variable: v1,
                    high: h1,
                    low: l1,
                },
                RawNode::Node {
                    variable: v2,
                    high: h2,
                    low: l2,
                },
            ) => v1 == v2 && h1.equals_(h2, visited) && l1.equals_(l2, visited),
            _ => false,
        }
    }

    /// Eliminate every node whose branches are structurally equal.
    ///
    /// Idempotent; subtrees that need no change are kept as they are.
    pub fn reduce(&self) -> RawBdd {
        let mut cache = HashMap::new();
        self.reduce_(&mut cache)
    }

    fn reduce_(&self, cache: &mut HashMap<usize, RawBdd>) -> RawBdd {
        let RawNode::Node {
            variable,
            high,
            low,
        } = &*self.0
        else {
            return self.clone();
        };

        if let Some(res) = cache.get(&self.addr()) {
            return res.clone();
        }

        let h = high.reduce_(cache);
        let l = low.reduce_(cache);
        let res = if h.equals(&l) {
            h
        } else if h.ptr_eq(high) && l.ptr_eq(low) {
            self.clone()
        } else {
            RawBdd::node(*variable, h, l)
        };

        cache.insert(self.addr(), res.clone());
        res
    }

    /// Merge structurally identical subtrees into shared instances.
    ///
    /// `table` maps descriptors to the instance chosen for them and is filled
    /// as the diagram is traversed. Passing the same table for several
    /// diagrams shares subtrees across all of them. Compressing an already
    /// compressed diagram with the same table returns the same instance.
    pub fn compress(&self, table: &mut CompressTable) -> RawBdd {
        if let Some(res) = table.get(&self.descriptor()) {
            return res.clone();
        }

        let candidate = match &*self.0 {
            RawNode::Leaf(_) => self.clone(),
            RawNode::Node {
                variable,
                high,
                low,
            } => {
                let h = high.compress(table);
                let l = low.compress(table);
                if h.ptr_eq(high) && l.ptr_eq(low) {
                    self.clone()
                } else {
                    RawBdd::node(*variable, h, l)
                }
            }
        };

        table
            .entry(candidate.descriptor())
            .or_insert(candidate)
            .clone()
    }
}

impl Display for RawBdd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &*self.0 {
            RawNode::Leaf(false) => write!(f, "(0)"),
            RawNode::Leaf(true) => write!(f, "(1)"),
            RawNode::Node {
                variable,
                high,
                low,
            } => write!(f, "(x{}, {}, {})", variable, high, low),
        }
    }
}

impl Bdd {
    /// Detach `f` from the manager, keeping its sharing.
    pub fn export(&self, f: Ref) -> RawBdd {
        debug!("export(f = {})", f);
        let mut cache = HashMap::new();
        cache.insert(Ref::FALSE, RawBdd::leaf(false));
        cache.insert(Ref::TRUE, RawBdd::leaf(true));
        self.export_(f, &mut cache)
    }

    fn export_(&self, f: Ref, cache: &mut HashMap<Ref, RawBdd>) -> RawBdd {
        if let Some(res) = cache.get(&f) {
            return res.clone();
        }
        let node = self.node(f);
        let high = self.export_(node.high, cache);
        let low = self.export_(node.low, cache);
        let res = RawBdd::node(node.variable, high, low);
        cache.insert(f, res.clone());
        res
    }

    /// Canonicalize a detached diagram into this manager.
    ///
    /// The raw diagram may be unreduced, unshared, or out of order; the result
    /// is the canonical diagram of the same function.
    pub fn import(&self, raw: &RawBdd) -> Ref {
        debug!("import(...)");
        let mut cache = HashMap::new();
        self.import_(raw, &mut cache)
    }

    fn import_(&self, raw: &RawBdd, cache: &mut HashMap<usize, Ref>) -> Ref {
        let RawNode::Node {
            variable,
            high,
            low,
        } = &*raw.0
        else {
            return Ref::leaf(raw.value() == Some(true));
        };

        if let Some(&res) = cache.get(&raw.addr()) {
            return res;
        }

        let h = self.import_(high, cache);
        let l = self.import_(low, cache);
        let res = self.mk_ordered(*variable, h, l);
        cache.insert(raw.addr(), res);
        res
    }
}
