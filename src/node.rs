//! OR-nodes (`MetaNode`) and AND-nodes.
//!
//! An OR-node decides the value of one variable: it has one AND-node per value
//! (or a single AND-node shared by every value once compacted). An AND-node is
//! a weighted conjunction of independent sub-diagrams, each rooted at an
//! OR-node over a distinct variable.
//!
//! The value of a diagram under a complete assignment `a` is
//!
//! ```text
//! value(OR)  = OR.weight * value(OR.branch(a[OR.var]))
//! value(AND) = AND.weight * Π value(child)
//! value(0) = 0, value(1) = 1
//! ```

use crate::reference::Ref;
use crate::types::Var;
use crate::utils::{approx_eq, hash_all, MyHash};

#[derive(Debug, Clone, PartialEq)]
pub struct AndNode {
    pub weight: f64,
    pub children: Vec<Ref>,
}

impl AndNode {
    pub fn new(weight: f64, children: Vec<Ref>) -> Self {
        Self { weight, children }
    }

    pub fn contains_zero(&self) -> bool {
        self.children.contains(&Ref::ZERO)
    }

    /// The weight this branch contributes to a sum: zero when the branch is
    /// absorbed by the `Zero` terminal.
    pub fn effective_weight(&self) -> f64 {
        if self.contains_zero() {
            0.0
        } else {
            self.weight
        }
    }

    /// Structural equality: identical children and weights within `tolerance`.
    pub fn same_as(&self, other: &AndNode, tolerance: f64) -> bool {
        self.children == other.children && approx_eq(self.weight, other.weight, tolerance)
    }
}

#[derive(Debug, Clone)]
pub struct MetaNode {
    var: Option<Var>,
    card: usize,
    weight: f64,
    children: Vec<AndNode>,
}

impl MetaNode {
    /// Create an OR-node over `var`.
    ///
    /// # Panics
    ///
    /// Panics unless `children.len()` is either `card` or 1.
    pub fn new(var: Var, card: usize, children: Vec<AndNode>, weight: f64) -> Self {
        assert!(card >= 1, "Cardinality of {} must be at least 1", var);
        assert!(
            children.len() == card || children.len() == 1,
            "{} has {} branches, expected {} or 1",
            var,
            children.len(),
            card
        );
        Self {
            var: Some(var),
            card,
            weight,
            children,
        }
    }

    pub(crate) fn terminal() -> Self {
        Self {
            var: None,
            card: 0,
            weight: 1.0,
            children: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.var.is_none()
    }

    /// Variable of the node (`None` for terminals).
    pub fn variable(&self) -> Option<Var> {
        self.var
    }

    /// Variable of a non-terminal node.
    pub fn var(&self) -> Var {
        match self.var {
            Some(v) => v,
            None => panic!("Terminal node has no variable"),
        }
    }

    pub fn card(&self) -> usize {
        self.card
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn children(&self) -> &[AndNode] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<AndNode>) {
        assert!(
            children.len() == self.card || children.len() == 1,
            "{} has {} branches, expected {} or 1",
            self.var(),
            children.len(),
            self.card
        );
        self.children = children;
    }

    /// The branch taken when the variable has value `k`.
    pub fn branch(&self, k: usize) -> &AndNode {
        assert!(k < self.card, "Value {} out of range for {} (card = {})", k, self.var(), self.card);
        if self.children.len() == 1 {
            &self.children[0]
        } else {
            &self.children[k]
        }
    }

    /// All branches are structurally equal.
    pub fn is_redundant(&self, tolerance: f64) -> bool {
        match self.children.split_first() {
            Some((first, rest)) => rest.iter().all(|c| c.same_as(first, tolerance)),
            None => false,
        }
    }

    /// Structural equality as used by the unique table.
    ///
    /// With `canonical_only`, weights are ignored altogether.
    pub fn matches(&self, other: &MetaNode, tolerance: f64, canonical_only: bool) -> bool {
        if self.is_terminal() || other.is_terminal() {
            return false;
        }
        if self.var != other.var || self.card != other.card || self.children.len() != other.children.len() {
            return false;
        }
        if canonical_only {
            return self.children.iter().zip(&other.children).all(|(a, b)| a.children == b.children);
        }
        approx_eq(self.weight, other.weight, tolerance)
            && self.children.iter().zip(&other.children).all(|(a, b)| a.same_as(b, tolerance))
    }
}

impl MyHash for MetaNode {
    /// Hash over the variable and the child handles.
    ///
    /// Weights are left out so that nodes equal up to the tolerance land in the
    /// same bucket.
    fn hash(&self) -> u64 {
        let var = self.var.map_or(u64::MAX, |v| v.id() as u64);
        let head = [var, self.card as u64];
        let body = self
            .children
            .iter()
            .flat_map(|and| std::iter::once(and.children.len() as u64).chain(and.children.iter().map(|c| c.get() as u64)));
        hash_all(head.into_iter().chain(body))
    }
}
