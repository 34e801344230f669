//! The [`Bdd`] manager and the core diagram algorithms.
//!
//! A manager owns two tables:
//!
//! - the **unique table**, an arena of nodes deduplicated by their
//!   `(variable, high, low)` descriptor, and
//! - the **computed table**, a cache of operation results keyed by the
//!   operation and operand indices.
//!
//! Every non-leaf node is created by [`Bdd::mk_node`], which elides redundant
//! tests and consults the unique table. As a consequence, two references
//! produced by the same manager denote the same boolean function iff they are
//! equal, and every algorithm here can rely on index equality.
//!
//! Variables are ordered by their id: along every path from the root, ids
//! strictly increase. Id `0` is reserved for the two leaves.
//!
//! A manager is single-threaded (it is not `Sync`). Create one manager per
//! diagram universe; references from different managers must not be mixed.

use std::cell::RefCell;
use std::cmp::min;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Debug;

use log::debug;

use crate::cache::Cache;
use crate::node::Node;
use crate::op::Op;
use crate::reference::Ref;
use crate::table::Table;
use crate::types::{current_id, next_id};

type Storage = Table<Node>;

/// Key of the computed table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpKey {
    Apply(Op, Ref, Ref),
    Set(Ref, u32, bool),
    Next(Ref),
    Prev(Ref),
}

/// Sizing of a [`Bdd`] manager.
///
/// Both tables grow on demand; the bits only set their initial capacity.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BddConfig {
    /// Initial node arena capacity is `2^storage_bits`.
    pub storage_bits: usize,
    /// Initial computed table capacity is `2^cache_bits`.
    pub cache_bits: usize,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            storage_bits: 20,
            cache_bits: 16,
        }
    }
}

impl BddConfig {
    pub fn with_storage_bits(mut self, bits: usize) -> Self {
        self.storage_bits = bits;
        self
    }

    pub fn with_cache_bits(mut self, bits: usize) -> Self {
        self.cache_bits = bits;
        self
    }
}

pub struct Bdd {
    storage: RefCell<Storage>,
    cache: RefCell<Cache<OpKey, Ref>>,
}

impl Bdd {
    pub fn new(storage_bits: usize) -> Self {
        Self::with_config(BddConfig {
            storage_bits,
            cache_bits: min(storage_bits, 16),
        })
    }

    pub fn with_config(config: BddConfig) -> Self {
        assert!(
            config.storage_bits <= 31,
            "Storage bits should be in the range 0..=31"
        );
        debug!("Bdd::with_config({:?})", config);

        let mut storage = Storage::new(config.storage_bits);

        // Allocate the leaves at their fixed positions:
        let zero = storage.add(Node::leaf(false));
        let one = storage.add(Node::leaf(true));
        assert_eq!(zero, Ref::FALSE.index());
        assert_eq!(one, Ref::TRUE.index());

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(config.cache_bits)),
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::with_config(BddConfig::default())
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        let cache = self.cache.borrow();
        f.debug_struct("Bdd")
            .field("capacity", &storage.capacity())
            .field("size", &storage.size())
            .field("buckets", &storage.num_buckets())
            .field("cache_size", &cache.len())
            .finish()
    }
}

impl Bdd {
    pub fn cache(&self) -> std::cell::Ref<'_, Cache<OpKey, Ref>> {
        self.cache.borrow()
    }

    /// Drop all memoized results. Nodes are kept.
    pub fn clear_cache(&self) {
        debug!("Clearing the computed table");
        self.cache.borrow_mut().clear();
    }

    /// Number of nodes in the arena, including both leaves.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().size()
    }

    pub fn node(&self, node: Ref) -> Node {
        let storage = self.storage.borrow();
        assert!(
            node.index() <= storage.size(),
            "Reference {} does not belong to this manager",
            node
        );
        storage[node.index()]
    }

    /// Variable of the node, `0` for leaves.
    pub fn variable(&self, node: Ref) -> u32 {
        self.node(node).variable
    }
    pub fn high(&self, node: Ref) -> Ref {
        self.node(node).high
    }
    pub fn low(&self, node: Ref) -> Ref {
        self.node(node).low
    }
    /// Value of a leaf, `None` for decision nodes.
    pub fn value(&self, node: Ref) -> Option<bool> {
        let node = self.node(node);
        if node.is_leaf() {
            Some(node.value)
        } else {
            None
        }
    }

    pub fn is_false(&self, node: Ref) -> bool {
        node == Ref::FALSE
    }
    pub fn is_true(&self, node: Ref) -> bool {
        node == Ref::TRUE
    }
    pub fn is_leaf(&self, node: Ref) -> bool {
        node.is_leaf()
    }

    /// Return the leaf for `value`.
    pub fn leaf(&self, value: bool) -> Ref {
        Ref::leaf(value)
    }

    /// Check that `v` may label a node with `node` as a branch.
    fn is_above(&self, v: u32, node: Ref) -> bool {
        let w = self.variable(node);
        w == 0 || v < w
    }

    /// Create (or find) the node testing `v` with the given branches.
    ///
    /// ```text
    /// mk(v, H, H) = H
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `v == 0`, or if a branch tests a variable not strictly greater
    /// than `v`.
    pub fn mk_node(&self, v: u32, high: Ref, low: Ref) -> Ref {
        debug!("mk(v = {}, high = {}, low = {})", v, high, low);

        assert_ne!(v, 0, "Variable index should not be zero");

        // Handle redundant tests
        if high == low {
            debug!("mk: redundant test {} == {}", high, low);
            return high;
        }

        assert!(
            self.is_above(v, high) && self.is_above(v, low),
            "Variable {} must be above both branches (x{}, x{})",
            v,
            self.variable(high),
            self.variable(low)
        );

        let i = self.storage.borrow_mut().put(Node::decision(v, high, low));
        Ref::new(i as u32)
    }

    /// The function `x_v`.
    pub fn mk_var(&self, v: u32) -> Ref {
        self.mk_node(v, Ref::TRUE, Ref::FALSE)
    }

    /// The function `¬x_v`.
    pub fn mk_nvar(&self, v: u32) -> Ref {
        self.mk_node(v, Ref::FALSE, Ref::TRUE)
    }

    /// Node testing `v` for diagrams in arbitrary order:
    ///
    /// ```text
    /// (x_v ∧ H) ∨ (¬x_v ∧ L)
    /// ```
    ///
    /// Falls back to [`Bdd::apply`] when `v` is not above both branches.
    pub(crate) fn mk_ordered(&self, v: u32, high: Ref, low: Ref) -> Ref {
        if high == low || (self.is_above(v, high) && self.is_above(v, low)) {
            return self.mk_node(v, high, low);
        }
        debug!(
            "mk_ordered: x{} is not above (x{}, x{}), composing",
            v,
            self.variable(high),
            self.variable(low)
        );
        let x = self.mk_var(v);
        let h = self.apply_and(x, high);
        let l = self.apply_and(self.apply_not(x), low);
        self.apply_or(h, l)
    }

    /// Structural equality.
    ///
    /// For references produced by this manager, this coincides with `p == q`.
    pub fn equals(&self, p: Ref, q: Ref) -> bool {
        let mut visited = HashSet::new();
        self.equals_(p, q, &mut visited)
    }

    fn equals_(&self, p: Ref, q: Ref, visited: &mut HashSet<(Ref, Ref)>) -> bool {
        if p == q {
            return true;
        }
        if !visited.insert((p, q)) {
            // Already being compared higher up, or already known to be equal.
            return true;
        }
        let (a, b) = (self.node(p), self.node(q));
        if a.variable != b.variable {
            return false;
        }
        if a.is_leaf() {
            return a.value == b.value;
        }
        self.equals_(a.high, b.high, visited) && self.equals_(a.low, b.low, visited)
    }

    /// Cofactors `(high, low)` of `node` with respect to `v`, where `v` is not
    /// below the top variable of `node`.
    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index should not be zero");

        let n = self.node(node);
        if n.is_leaf() || v < n.variable {
            return (node, node);
        }
        assert_eq!(v, n.variable);
        (n.high, n.low)
    }

    /// Apply a binary operator given by its truth table.
    ///
    /// ```text
    /// apply(op, x ? P1 : P0, x ? Q1 : Q0) = x ? apply(op, P1, Q1) : apply(op, P0, Q0)
    /// apply(op, a, b)                     = op(a, b)  for leaves a, b
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use robdd::bdd::Bdd;
    /// use robdd::op::Op;
    /// use robdd::reference::Ref;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_var(1);
    /// let not_x = bdd.mk_nvar(1);
    /// assert_eq!(bdd.apply(Op::OR, x, not_x), Ref::TRUE);
    /// assert_eq!(bdd.apply(Op::AND, x, not_x), Ref::FALSE);
    /// ```
    pub fn apply(&self, op: Op, p: Ref, q: Ref) -> Ref {
        debug!("apply(op = {}, p = {}, q = {})", op, p, q);

        let (a, b) = (self.node(p), self.node(q));

        // Both operands are leaves: evaluate the truth table.
        if a.is_leaf() && b.is_leaf() {
            return Ref::leaf(op.eval(a.value, b.value));
        }

        // Swapping operands together with the table rows gives the same result,
        // so store the pair in a fixed order.
        let key = if p <= q {
            OpKey::Apply(op, p, q)
        } else {
            OpKey::Apply(op.flip(), q, p)
        };
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            debug!("cache: apply({}, {}, {}) -> {}", op, p, q, res);
            return res;
        }

        // Split on the smallest top variable.
        let v = match (a.is_leaf(), b.is_leaf()) {
            (false, false) => min(a.variable, b.variable),
            (false, true) => a.variable,
            _ => b.variable,
        };
        let (p1, p0) = self.top_cofactors(p, v);
        let (q1, q0) = self.top_cofactors(q, v);

        let high = self.apply(op, p1, q1);
        let low = self.apply(op, p0, q0);
        let res = self.mk_node(v, high, low);
        debug!("computed: apply({}, {}, {}) -> {}", op, p, q, res);

        self.cache.borrow_mut().insert(key, res);
        res
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        debug!("apply_not(f = {})", f);
        self.apply(Op::IMPLY, f, Ref::FALSE)
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_and(u = {}, v = {})", u, v);
        self.apply(Op::AND, u, v)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_or(u = {}, v = {})", u, v);
        self.apply(Op::OR, u, v)
    }

    pub fn apply_xor(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_xor(u = {}, v = {})", u, v);
        self.apply(Op::XOR, u, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_eq(u = {}, v = {})", u, v);
        self.apply(Op::EQ, u, v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_imply(u = {}, v = {})", u, v);
        self.apply(Op::IMPLY, u, v)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        debug!("apply_and_many(...)");
        let mut res = Ref::TRUE;
        for node in nodes.into_iter() {
            res = self.apply_and(res, node);
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        debug!("apply_or_many(...)");
        let mut res = Ref::FALSE;
        for node in nodes.into_iter() {
            res = self.apply_or(res, node);
        }
        res
    }

    // f|v<-b
    pub fn set(&self, f: Ref, v: u32, b: bool) -> Ref {
        debug!("set(f = {}, v = {}, b = {})", f, v, b);
        assert_ne!(v, 0, "Variable index should not be zero");

        let node = self.node(f);

        if node.is_leaf() || v < node.variable {
            // 'f' does not depend on 'v'
            return f;
        }

        if v == node.variable {
            return if b { node.high } else { node.low };
        }

        let key = OpKey::Set(f, v, b);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            debug!("cache: set({}, {}, {}) -> {}", f, v, b, res);
            return res;
        }

        let high = self.set(node.high, v, b);
        let low = self.set(node.low, v, b);
        let res = self.mk_node(node.variable, high, low);

        self.cache.borrow_mut().insert(key, res);
        res
    }

    /// Existential quantification: `∃v. f = f|v<-1 ∨ f|v<-0`.
    pub fn exists(&self, f: Ref, v: u32) -> Ref {
        debug!("exists(f = {}, v = {})", f, v);
        let f1 = self.set(f, v, true);
        let f0 = self.set(f, v, false);
        self.apply_or(f1, f0)
    }

    /// Universal quantification: `∀v. f = f|v<-1 ∧ f|v<-0`.
    pub fn forall(&self, f: Ref, v: u32) -> Ref {
        debug!("forall(f = {}, v = {})", f, v);
        let f1 = self.set(f, v, true);
        let f0 = self.set(f, v, false);
        self.apply_and(f1, f0)
    }

    pub fn exists_many(&self, f: Ref, vars: impl IntoIterator<Item = u32>) -> Ref {
        debug!("exists_many(f = {}, ...)", f);
        let mut res = f;
        for v in vars {
            res = self.exists(res, v);
        }
        res
    }

    /// Rename every variable to its next-state counterpart.
    ///
    /// See [`crate::types`] for the tagging convention. The caller must only
    /// pass diagrams built over ids produced by [`Var`][crate::types::Var].
    pub fn next(&self, f: Ref) -> Ref {
        debug!("next(f = {})", f);
        if f.is_leaf() {
            return f;
        }

        let key = OpKey::Next(f);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            return res;
        }

        let node = self.node(f);
        let high = self.next(node.high);
        let low = self.next(node.low);
        let res = self.mk_ordered(next_id(node.variable), high, low);

        self.cache.borrow_mut().insert(key, res);
        res
    }

    /// Rename every variable (current or next) to its current-state id.
    ///
    /// `prev(next(f)) == f` for any `f` over current-state variables.
    pub fn prev(&self, f: Ref) -> Ref {
        debug!("prev(f = {})", f);
        if f.is_leaf() {
            return f;
        }

        let key = OpKey::Prev(f);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            return res;
        }

        let node = self.node(f);
        let high = self.prev(node.high);
        let low = self.prev(node.low);
        let res = self.mk_ordered(current_id(node.variable), high, low);

        self.cache.borrow_mut().insert(key, res);
        res
    }

    /// Rebuild `f` through [`Bdd::mk_node`].
    ///
    /// Diagrams of a manager are always reduced, so this returns `f` itself.
    pub fn reduce(&self, f: Ref) -> Ref {
        debug!("reduce(f = {})", f);
        let mut cache = HashMap::new();
        self.reduce_(f, &mut cache)
    }

    fn reduce_(&self, f: Ref, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if f.is_leaf() {
            return f;
        }
        if let Some(&res) = cache.get(&f) {
            return res;
        }
        let node = self.node(f);
        let high = self.reduce_(node.high, cache);
        let low = self.reduce_(node.low, cache);
        let res = self.mk_node(node.variable, high, low);
        cache.insert(f, res);
        res
    }

    /// Check whether every model of `q` is a model of `p`.
    pub fn contains(&self, p: Ref, q: Ref) -> bool {
        debug!("contains(p = {}, q = {})", p, q);
        self.is_true(self.apply_imply(q, p))
    }

    /// Check whether `p` and `q` have a common model.
    pub fn intersects(&self, p: Ref, q: Ref) -> bool {
        debug!("intersects(p = {}, q = {})", p, q);
        !self.is_false(self.apply_and(q, p))
    }

    /// Evaluate `f` under the given assignment of variables.
    pub fn evaluate(&self, f: Ref, assignment: impl Fn(u32) -> bool) -> bool {
        let mut node = self.node(f);
        while !node.is_leaf() {
            node = if assignment(node.variable) {
                self.node(node.high)
            } else {
                self.node(node.low)
            };
        }
        node.value
    }

    /// Variables `f` depends on.
    pub fn support(&self, f: Ref) -> BTreeSet<u32> {
        let mut visited = HashSet::new();
        let mut support = BTreeSet::new();
        let mut stack = vec![f];

        while let Some(node) = stack.pop() {
            if node.is_leaf() || !visited.insert(node) {
                continue;
            }
            let n = self.node(node);
            support.insert(n.variable);
            stack.push(n.high);
            stack.push(n.low);
        }

        support
    }

    pub fn to_bracket_string(&self, node: Ref) -> String {
        if self.is_false(node) {
            return "(0)".to_string();
        } else if self.is_true(node) {
            return "(1)".to_string();
        }

        let n = self.node(node);

        format!(
            "{}:(x{}, {}, {})",
            node,
            n.variable,
            self.to_bracket_string(n.high),
            self.to_bracket_string(n.low)
        )
    }
}
