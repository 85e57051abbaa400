//! The node manager: arena, unique table and caches of one compilation session.
//!
//! Every diagram lives inside a [`NodeManager`] and is addressed by a [`Ref`]
//! handle. The manager hash-conses OR-nodes, so building a node that is
//! structurally equal to an existing one returns the existing handle.
//!
//! ```
//! use aomdd_rs::manager::NodeManager;
//! use aomdd_rs::scope::Scope;
//! use aomdd_rs::types::Var;
//!
//! let mgr = NodeManager::default();
//! let scope = Scope::from_iter([(Var::new(0), 2)]);
//! let f = mgr.create_from_table(&scope, &[0.25, 0.75], 1.0);
//! let g = mgr.create_from_table(&scope, &[0.25, 0.75], 1.0);
//! assert_eq!(f, g);
//! ```
//!
//! The algorithms are split over several modules, each adding methods to the
//! manager: [`apply`][crate::apply], [`reduce`][crate::reduce],
//! [`marginalize`][crate::marginalize], [`eval`][crate::eval],
//! [`stats`][crate::stats], [`debug`][crate::debug] and [`dot`][crate::dot].

use std::cell::RefCell;
use std::fmt::Debug;

use log::debug;

use crate::apply::ApplyKey;
use crate::cache::Cache;
use crate::eval::ElimKey;
use crate::node::{AndNode, MetaNode};
use crate::reference::Ref;
use crate::scope::Scope;
use crate::storage::Storage;
use crate::table::UniqueTable;
use crate::types::Var;
use crate::utils::MyHash;

/// Tunable parameters of a [`NodeManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Two weights closer than this are considered equal when deduplicating
    /// nodes (default: `1e-10`).
    pub tolerance: f64,
    /// Ignore weights entirely when deduplicating nodes (default: `false`).
    pub canonical_only: bool,
    /// Initial number of arena slots (default: `1024`).
    pub storage_capacity: usize,
    /// The operation cache starts with room for `2^cache_bits` entries
    /// (default: `14`).
    pub cache_bits: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            canonical_only: false,
            storage_capacity: 1024,
            cache_bits: 14,
        }
    }
}

/// Combination operator of [`NodeManager::apply`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    Product,
    Sum,
}

pub struct NodeManager {
    config: ManagerConfig,
    pub(crate) storage: RefCell<Storage<MetaNode>>,
    pub(crate) unique: RefCell<UniqueTable>,
    pub(crate) cache: RefCell<Cache<ApplyKey, Ref>>,
    pub(crate) elim_memo: RefCell<Cache<ElimKey, f64>>,
}

impl NodeManager {
    pub fn new(config: ManagerConfig) -> Self {
        assert!(
            config.tolerance.is_finite() && config.tolerance >= 0.0,
            "Tolerance must be a finite non-negative number, got {}",
            config.tolerance
        );
        assert!(config.cache_bits <= 31, "Cache bits should be in the range 0..=31");

        let mut storage = Storage::with_capacity(config.storage_capacity.max(2));

        // Allocate the terminal nodes:
        let zero = storage.alloc(MetaNode::terminal());
        let one = storage.alloc(MetaNode::terminal());
        assert_eq!(zero, Ref::ZERO.index());
        assert_eq!(one, Ref::ONE.index());

        Self {
            storage: RefCell::new(storage),
            unique: RefCell::new(UniqueTable::new()),
            cache: RefCell::new(Cache::new(config.cache_bits)),
            elim_memo: RefCell::new(Cache::new(config.cache_bits.min(10))),
            config,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

impl Default for NodeManager {
    fn default() -> Self {
        NodeManager::new(ManagerConfig::default())
    }
}

impl Debug for NodeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("NodeManager")
            .field("size", &storage.size())
            .field("real_size", &storage.real_size())
            .field("unique", &self.unique.borrow().len())
            .field("tolerance", &self.config.tolerance)
            .finish()
    }
}

impl NodeManager {
    pub fn zero(&self) -> Ref {
        Ref::ZERO
    }
    pub fn one(&self) -> Ref {
        Ref::ONE
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node.is_zero()
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node.is_one()
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.is_terminal()
    }

    /// A copy of the stored node.
    pub fn node(&self, node: Ref) -> MetaNode {
        self.storage.borrow().get(node.index()).clone()
    }

    /// Variable of the node (`None` for terminals).
    pub fn variable(&self, node: Ref) -> Option<Var> {
        self.storage.borrow().get(node.index()).variable()
    }

    pub fn card(&self, node: Ref) -> usize {
        self.storage.borrow().get(node.index()).card()
    }

    /// OR-weight of the node (1 for terminals).
    pub fn weight(&self, node: Ref) -> f64 {
        self.storage.borrow().get(node.index()).weight()
    }

    /// The AND-node taken when the variable of `node` has value `k`.
    pub fn branch(&self, node: Ref, k: usize) -> AndNode {
        self.storage.borrow().get(node.index()).branch(k).clone()
    }

    /// Number of canonical non-terminal nodes.
    pub fn num_nodes(&self) -> usize {
        self.unique.borrow().len()
    }

    /// Number of occupied arena slots, terminals and non-canonical nodes
    /// included.
    pub fn num_allocated(&self) -> usize {
        self.storage.borrow().real_size()
    }

    /// Hits, misses and size of the operation cache.
    pub fn cache_stats(&self) -> (usize, usize, usize) {
        let cache = self.cache.borrow();
        (cache.hits(), cache.misses(), cache.len())
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl NodeManager {
    /// Canonical handle for `node`: an existing equal node or a new one.
    pub(crate) fn intern(&self, node: MetaNode) -> Ref {
        let hash = node.hash();
        if let Some(existing) = self.find_canonical(hash, &node, None) {
            debug!("intern: {} already canonical", existing);
            return existing;
        }

        let index = self.storage.borrow_mut().alloc(node);
        let res = Ref::new(index as u32);
        self.unique.borrow_mut().insert(hash, res);
        debug!("intern: inserted {}", res);
        res
    }

    /// Find a canonical node equal to `node`, skipping `except`.
    pub(crate) fn find_canonical(&self, hash: u64, node: &MetaNode, except: Option<Ref>) -> Option<Ref> {
        let storage = self.storage.borrow();
        let tolerance = self.config.tolerance;
        let canonical_only = self.config.canonical_only;
        self.unique.borrow().find(hash, |r| {
            Some(r) != except && storage.get(r.index()).matches(node, tolerance, canonical_only)
        })
    }

    /// Create (or find) the OR-node over `var` with the given branches.
    ///
    /// # Panics
    ///
    /// Panics unless the number of branches is `card` or 1.
    pub fn create_meta_node(&self, var: Var, card: usize, children: Vec<AndNode>, weight: f64) -> Ref {
        debug!("create_meta_node(var = {}, card = {}, weight = {})", var, card, weight);
        self.intern(MetaNode::new(var, card, children, weight))
    }

    /// Same as [`create_meta_node`][Self::create_meta_node], with the variable
    /// given as a single-variable scope.
    pub fn create_meta_node_from_scope(&self, scope: &Scope, children: Vec<AndNode>, weight: f64) -> Ref {
        assert_eq!(scope.num_vars(), 1, "Scope must be over one variable, got {}", scope);
        let (var, card) = scope.entries()[0];
        self.create_meta_node(var, card, children, weight)
    }

    /// Lower a dense table over `scope` into a diagram.
    ///
    /// The table is laid out in row-major order (the last scope variable
    /// changes fastest). `weight` becomes the OR-weight of the returned root.
    pub fn create_from_table(&self, scope: &Scope, values: &[f64], weight: f64) -> Ref {
        debug!("create_from_table(scope = {}, weight = {})", scope, weight);
        assert!(!scope.is_empty(), "Cannot build a diagram over an empty scope");
        assert_eq!(
            scope.cardinality(),
            values.len(),
            "Table of length {} does not match scope {}",
            values.len(),
            scope
        );
        self.table_node(scope.entries(), values, weight)
    }

    fn table_node(&self, entries: &[(Var, usize)], values: &[f64], weight: f64) -> Ref {
        let (var, card) = entries[0];
        let rest = &entries[1..];
        let children = if rest.is_empty() {
            values
                .iter()
                .map(|&v| {
                    let terminal = if v == 0.0 { Ref::ZERO } else { Ref::ONE };
                    AndNode::new(v, vec![terminal])
                })
                .collect()
        } else {
            let block = values.len() / card;
            values
                .chunks(block)
                .map(|chunk| AndNode::new(1.0, vec![self.table_node(rest, chunk, 1.0)]))
                .collect()
        };
        self.create_meta_node(var, card, children, weight)
    }

    /// Copies of `nodes` with their OR-weights multiplied by `factor`.
    ///
    /// Terminals pass through unchanged. The original nodes are left intact.
    pub fn reweigh_nodes(&self, nodes: &[Ref], factor: f64) -> Vec<Ref> {
        nodes
            .iter()
            .map(|&r| {
                if r.is_terminal() {
                    return r;
                }
                let node = self.node(r);
                self.create_meta_node(node.var(), node.card(), node.children().to_vec(), node.weight() * factor)
            })
            .collect()
    }

    /// Free every node not reachable from `roots`.
    ///
    /// All caches are cleared, since they may mention freed handles.
    pub fn collect_garbage(&self, roots: &[Ref]) {
        debug!("Collecting garbage...");

        self.cache.borrow_mut().clear();
        self.elim_memo.borrow_mut().clear();

        let alive = self.descendants(roots.iter().copied());
        debug!("Alive nodes: {}", alive.len());

        let dead: Vec<usize> = self
            .storage
            .borrow()
            .occupied()
            .filter(|&i| i > Ref::ONE.index() && !alive.contains(&Ref::new(i as u32)))
            .collect();

        let mut storage = self.storage.borrow_mut();
        let mut unique = self.unique.borrow_mut();
        for i in dead {
            let hash = storage.get(i).hash();
            unique.remove(hash, Ref::new(i as u32));
            storage.drop(i);
        }
        debug!("After GC: {} allocated, {} canonical", storage.real_size(), unique.len());
    }
}
