//! Evaluation and elimination queries.
//!
//! [`NodeManager::evaluate`] computes the value of a diagram under a complete
//! assignment. [`NodeManager::sum`] and [`NodeManager::maximum`] eliminate every
//! variable left unassigned, by sum-product and max-product respectively.
//!
//! Elimination results are memoised per `(node, assignment)` pair, so a node
//! shared by many paths is visited once per query. The memo is keyed by a
//! fingerprint of the assignment and survives between queries until
//! [`NodeManager::clear_elimination_memo`] is called.

use log::debug;

use crate::assignment::Assignment;
use crate::manager::NodeManager;
use crate::node::AndNode;
use crate::reference::Ref;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Elimination {
    Sum,
    Max,
}

pub type ElimKey = (Elimination, Ref, u64);

impl NodeManager {
    /// Value of the diagram rooted at `root` under `assignment`.
    ///
    /// # Panics
    ///
    /// Panics if a variable met on the way has no value in `assignment`.
    pub fn evaluate(&self, root: Ref, assignment: &Assignment) -> f64 {
        if root.is_zero() {
            return 0.0;
        }
        if root.is_one() {
            return 1.0;
        }

        let (weight, branch) = {
            let storage = self.storage.borrow();
            let node = storage.get(root.index());
            let k = assignment.value(node.var());
            (node.weight(), node.branch(k).clone())
        };

        let mut res = weight * branch.weight;
        for c in branch.children {
            if res == 0.0 {
                break;
            }
            res *= self.evaluate(c, assignment);
        }
        res
    }

    /// Sum over all completions of `assignment` (variables missing from the
    /// assignment are summed out too).
    pub fn sum(&self, root: Ref, assignment: &Assignment) -> f64 {
        debug!("sum(root = {}, assignment = {})", root, assignment);
        self.eliminate(Elimination::Sum, root, assignment, assignment.fingerprint())
    }

    /// Maximum over all completions of `assignment`.
    pub fn maximum(&self, root: Ref, assignment: &Assignment) -> f64 {
        debug!("maximum(root = {}, assignment = {})", root, assignment);
        self.eliminate(Elimination::Max, root, assignment, assignment.fingerprint())
    }

    pub fn clear_elimination_memo(&self) {
        self.elim_memo.borrow_mut().clear();
    }

    pub(crate) fn eliminate(&self, kind: Elimination, root: Ref, assignment: &Assignment, fingerprint: u64) -> f64 {
        if root.is_zero() {
            return 0.0;
        }
        if root.is_one() {
            return 1.0;
        }

        let key = (kind, root, fingerprint);
        let cached = self.elim_memo.borrow_mut().get(&key);
        if let Some(res) = cached {
            return res;
        }

        let node = self.node(root);
        let res = match assignment.get(node.var()) {
            Some(k) => self.eliminate_branch(kind, node.branch(k), assignment, fingerprint),
            None => {
                let values = (0..node.card()).map(|k| self.eliminate_branch(kind, node.branch(k), assignment, fingerprint));
                match kind {
                    Elimination::Sum => values.sum(),
                    Elimination::Max => values.fold(f64::NEG_INFINITY, f64::max),
                }
            }
        };
        let res = node.weight() * res;

        self.elim_memo.borrow_mut().insert(key, res);
        res
    }

    fn eliminate_branch(&self, kind: Elimination, branch: &AndNode, assignment: &Assignment, fingerprint: u64) -> f64 {
        let mut res = branch.weight;
        for &c in &branch.children {
            if res == 0.0 {
                break;
            }
            res *= self.eliminate(kind, c, assignment, fingerprint);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::scope::Scope;
    use crate::types::Var;

    fn v(i: u32) -> Var {
        Var::new(i)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_evaluate_table() {
        let mgr = NodeManager::default();
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 1.0);

        let mut a = Assignment::first(scope);
        for e in [0.1, 0.2, 0.3, 0.4] {
            assert_eq!(mgr.evaluate(f, &a), e);
            a.iterate();
        }
    }

    #[test]
    fn test_evaluate_root_weight() {
        let mgr = NodeManager::default();
        let scope = Scope::single(v(0), 2);
        let f = mgr.create_from_table(&scope, &[0.25, 0.5], 4.0);
        let a = Assignment::from_values(scope, &[1]);
        assert_eq!(mgr.evaluate(f, &a), 2.0);
    }

    #[test]
    #[should_panic(expected = "No value recorded for x1")]
    fn test_evaluate_missing_value() {
        let mgr = NodeManager::default();
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 1.0);
        let mut a = Assignment::new(scope);
        a.set(v(0), 1);
        mgr.evaluate(f, &a);
    }

    #[test]
    fn test_evaluate_short_circuit() {
        let mgr = NodeManager::default();
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.0, 0.0, 0.3, 0.4], 1.0);
        let g = mgr.create_meta_node(v(0), 2, vec![AndNode::new(0.0, vec![mgr.branch(f, 1).children[0]]), mgr.branch(f, 1)], 1.0);
        // `x1` is never looked at on the zero branch.
        let a = Assignment::from_values(Scope::single(v(0), 2), &[0]);
        assert_eq!(mgr.evaluate(g, &a), 0.0);
    }

    #[test]
    fn test_sum_and_max() {
        let mgr = NodeManager::default();
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 2.0);

        let empty = Assignment::new(Scope::new());
        assert_close(mgr.sum(f, &empty), 2.0);
        assert_close(mgr.maximum(f, &empty), 0.8);

        let mut a = Assignment::new(scope);
        a.set(v(0), 0);
        assert_close(mgr.sum(f, &a), 0.6);
        assert_close(mgr.maximum(f, &a), 0.4);
        a.set(v(0), 1);
        assert_close(mgr.sum(f, &a), 1.4);
    }

    #[test]
    fn test_sum_compacted() {
        let mgr = NodeManager::default();
        let f = mgr.create_meta_node(v(0), 4, vec![AndNode::new(0.25, vec![Ref::ONE])], 1.0);
        let empty = Assignment::new(Scope::new());
        assert_close(mgr.sum(f, &empty), 1.0);
        assert_close(mgr.maximum(f, &empty), 0.25);

        mgr.clear_elimination_memo();
        assert_close(mgr.sum(f, &empty), 1.0);
    }
}
