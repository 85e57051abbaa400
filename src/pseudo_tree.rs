//! Pseudo-tree ancestor queries.
//!
//! The diagram algorithms never build a pseudo-tree themselves: they only ask
//! for the parent of a variable, and for the nearest ancestor that belongs to
//! some variable subset (the tree *embedded* into that subset). Any structure
//! implementing [`PseudoTree`] can drive [`apply`][crate::manager::NodeManager::apply]
//! and [`marginalize`][crate::manager::NodeManager::marginalize].
//!
//! [`ParentTree`] is a plain parent-map implementation, enough for callers that
//! already computed the tree elsewhere (or for a chain over an elimination
//! order).

use std::collections::{HashMap, HashSet};

use crate::scope::Scope;
use crate::types::Var;

pub trait PseudoTree {
    /// Parent of `var`, or `None` for a root (or an unknown variable).
    fn parent(&self, var: Var) -> Option<Var>;

    /// Ancestor chain of `var`, nearest first.
    fn ancestors(&self, var: Var) -> Vec<Var> {
        let mut res = Vec::new();
        let mut cur = var;
        while let Some(p) = self.parent(cur) {
            res.push(p);
            cur = p;
        }
        res
    }

    /// Nearest proper ancestor of `var` that belongs to `subset`.
    ///
    /// This is the parent of `var` in the tree restricted to `subset`.
    fn embedded_parent(&self, var: Var, subset: &HashSet<Var>) -> Option<Var> {
        let mut cur = var;
        while let Some(p) = self.parent(cur) {
            if subset.contains(&p) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    /// Check whether `ancestor` is a proper ancestor of `var`.
    fn is_ancestor(&self, ancestor: Var, var: Var) -> bool {
        let mut cur = var;
        while let Some(p) = self.parent(cur) {
            if p == ancestor {
                return true;
            }
            cur = p;
        }
        false
    }

    /// Number of proper ancestors of `var`.
    fn depth(&self, var: Var) -> usize {
        self.ancestors(var).len()
    }
}

/// Rooted forest stored as a parent map.
#[derive(Debug, Clone, Default)]
pub struct ParentTree {
    parents: HashMap<Var, Option<Var>>,
    /// Insertion order, used to make traversals deterministic.
    order: Vec<Var>,
}

impl ParentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `(child, parent)` links.
    pub fn from_parents(links: impl IntoIterator<Item = (Var, Option<Var>)>) -> Self {
        let mut tree = Self::new();
        for (var, parent) in links {
            tree.add(var, parent);
        }
        tree
    }

    /// Build a chain: every variable is the parent of the next one.
    pub fn chain(order: &[Var]) -> Self {
        let mut tree = Self::new();
        let mut prev = None;
        for &var in order {
            tree.add(var, prev);
            prev = Some(var);
        }
        tree
    }

    /// Add `var` with the given parent.
    ///
    /// # Panics
    ///
    /// Panics if `var` is already in the tree or if the link closes a cycle.
    pub fn add(&mut self, var: Var, parent: Option<Var>) {
        assert!(!self.parents.contains_key(&var), "{} is already in the pseudo-tree", var);
        if let Some(p) = parent {
            assert!(p != var && !self.is_ancestor(var, p), "Adding {} under {} closes a cycle", var, p);
        }
        self.parents.insert(var, parent);
        self.order.push(var);
    }

    pub fn contains(&self, var: Var) -> bool {
        self.parents.contains_key(&var)
    }

    pub fn num_vars(&self) -> usize {
        self.order.len()
    }

    pub fn roots(&self) -> Vec<Var> {
        self.order
            .iter()
            .copied()
            .filter(|v| self.parent(*v).is_none())
            .collect()
    }

    pub fn children(&self, var: Var) -> Vec<Var> {
        self.order
            .iter()
            .copied()
            .filter(|&v| self.parent(v) == Some(var))
            .collect()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.order.iter().map(|&v| self.depth(v)).max().unwrap_or(0)
    }

    /// Restrict the tree to the variables of `scope`.
    ///
    /// Every variable of the scope is attached to its nearest ancestor within
    /// the scope. The designated root is the first root of the restricted
    /// forest in scope order.
    pub fn embed(&self, scope: &Scope) -> EmbeddedTree {
        let subset: HashSet<Var> = scope.vars().collect();
        let mut parents = HashMap::new();
        let mut root = None;
        for var in scope.vars() {
            let parent = self.embedded_parent(var, &subset);
            if parent.is_none() && root.is_none() {
                root = Some(var);
            }
            parents.insert(var, parent);
        }
        EmbeddedTree { parents, root }
    }
}

impl PseudoTree for ParentTree {
    fn parent(&self, var: Var) -> Option<Var> {
        self.parents.get(&var).copied().flatten()
    }
}

/// A pseudo-tree restricted to a subset of its variables.
#[derive(Debug, Clone)]
pub struct EmbeddedTree {
    parents: HashMap<Var, Option<Var>>,
    root: Option<Var>,
}

impl EmbeddedTree {
    /// The designated root of the embedding (`None` for an empty subset).
    pub fn root(&self) -> Option<Var> {
        self.root
    }

    pub fn num_vars(&self) -> usize {
        self.parents.len()
    }
}

impl PseudoTree for EmbeddedTree {
    fn parent(&self, var: Var) -> Option<Var> {
        self.parents.get(&var).copied().flatten()
    }
}
