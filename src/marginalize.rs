use std::collections::HashMap;

use log::{debug, trace};

use crate::apply::Partner;
use crate::assignment::Assignment;
use crate::eval::Elimination;
use crate::manager::{NodeManager, Operator};
use crate::node::AndNode;
use crate::pseudo_tree::PseudoTree;
use crate::reduce::normalize;
use crate::reference::Ref;
use crate::scope::Scope;

impl NodeManager {
    /// Sum the variables of `scope` out of the diagram rooted at `root`.
    ///
    /// Sub-diagrams mentioning only eliminated variables are summed up on the
    /// spot and folded into the weight of their AND-node. Every OR-node over an
    /// eliminated variable ends up with `card` copies of the summed branch, so
    /// the result still mentions that variable but no longer depends on it.
    /// Run [`full_reduce`][Self::full_reduce] afterwards to drop such nodes.
    ///
    /// # Panics
    ///
    /// Panics if an eliminated variable still has independent sub-diagrams
    /// over kept variables below it: such a sum has no AND/OR form.
    pub fn marginalize(&self, root: Ref, scope: &Scope, pt: &dyn PseudoTree) -> Ref {
        debug!("marginalize(root = {}, scope = {})", root, scope);
        let mut memo = HashMap::new();
        let mut closed = HashMap::new();
        let res = self.marginalize_rec(root, scope, pt, &mut memo, &mut closed);
        debug!("marginalize: {} -> {}", root, res);
        res
    }

    fn marginalize_rec(
        &self,
        root: Ref,
        scope: &Scope,
        pt: &dyn PseudoTree,
        memo: &mut HashMap<Ref, Ref>,
        closed: &mut HashMap<Ref, bool>,
    ) -> Ref {
        if root.is_terminal() {
            return root;
        }
        if let Some(&res) = memo.get(&root) {
            return res;
        }

        let node = self.node(root);
        let (var, card) = (node.var(), node.card());

        let mut branches = Vec::with_capacity(node.children().len());
        for and in node.children() {
            let mut weight = and.weight;
            let mut children = Vec::with_capacity(and.children.len());
            for &c in &and.children {
                if !c.is_terminal() && self.is_closed(c, scope, closed) {
                    weight *= self.total(c);
                } else {
                    children.push(self.marginalize_rec(c, scope, pt, memo, closed));
                }
            }
            if weight == 0.0 {
                branches.push(AndNode::new(0.0, vec![Ref::ZERO]));
            } else {
                branches.push(normalize(weight, children));
            }
        }

        let res = if scope.contains(var) {
            let branch = |k: usize| {
                if branches.len() == 1 {
                    branches[0].clone()
                } else {
                    branches[k].clone()
                }
            };
            let mut acc = branch(0);
            for k in 1..card {
                acc = self.combine_branch(Operator::Sum, acc, Partner::Aligned(branch(k)), pt);
            }
            debug!("marginalize: summed out {} at {}", var, root);
            self.create_meta_node(var, card, vec![acc; card], node.weight())
        } else {
            self.create_meta_node(var, card, branches, node.weight())
        };

        memo.insert(root, res);
        res
    }

    /// Whether every variable below `node` (itself included) is eliminated.
    fn is_closed(&self, node: Ref, scope: &Scope, closed: &mut HashMap<Ref, bool>) -> bool {
        if node.is_terminal() {
            return true;
        }
        if let Some(&res) = closed.get(&node) {
            return res;
        }
        let meta = self.node(node);
        let res = scope.contains(meta.var())
            && meta
                .children()
                .iter()
                .all(|and| and.children.iter().all(|&c| self.is_closed(c, scope, closed)));
        closed.insert(node, res);
        res
    }

    /// Sum of the diagram over all its variables.
    fn total(&self, node: Ref) -> f64 {
        let empty = Assignment::new(Scope::new());
        let res = self.eliminate(Elimination::Sum, node, &empty, empty.fingerprint());
        trace!("marginalize: folded {} = {}", node, res);
        res
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::assignment::Assignment;
    use crate::pseudo_tree::ParentTree;
    use crate::types::Var;

    fn v(i: u32) -> Var {
        Var::new(i)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_terminal() {
        let mgr = NodeManager::default();
        let pt = ParentTree::new();
        assert_eq!(mgr.marginalize(Ref::ONE, &Scope::single(v(0), 2), &pt), Ref::ONE);
    }

    #[test]
    fn test_marginalize_leaf() {
        let mgr = NodeManager::default();
        let pt = ParentTree::chain(&[v(0)]);
        let scope = Scope::single(v(0), 3);
        let f = mgr.create_from_table(&scope, &[0.1, 0.0, 0.6], 1.0);
        let m = mgr.marginalize(f, &scope, &pt);
        assert!(mgr.is_redundant(m));
        assert_close(mgr.branch(m, 0).weight, 0.7);

        let (res, w) = mgr.full_reduce(m);
        assert_eq!(res, vec![Ref::ONE]);
        assert_close(w, 0.7);
    }

    #[test]
    fn test_marginalize_all() {
        let mgr = NodeManager::default();
        let pt = ParentTree::chain(&[v(0), v(1)]);
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 1.0);
        let m = mgr.marginalize(f, &scope, &pt);

        let mut a = Assignment::first(scope);
        loop {
            assert_close(mgr.evaluate(m, &a), 1.0);
            if !a.iterate() {
                break;
            }
        }
        let (res, w) = mgr.full_reduce(m);
        assert_eq!(res, vec![Ref::ONE]);
        assert_close(w, 1.0);
    }

    #[test]
    fn test_marginalize_leading_variable() {
        let mgr = NodeManager::default();
        let pt = ParentTree::chain(&[v(0), v(1)]);
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 1.0);
        let m = mgr.marginalize(f, &Scope::single(v(0), 2), &pt);

        // Sum over A leaves g(B) = [0.4, 0.6].
        let mut a = Assignment::first(scope);
        let expected = [0.4, 0.6, 0.4, 0.6];
        for e in expected {
            assert_close(mgr.evaluate(m, &a), e);
            a.iterate();
        }
    }

    #[test]
    fn test_marginalize_branching_tree() {
        //     0
        //    / \
        //   1   2
        let mgr = NodeManager::default();
        let pt = ParentTree::from_parents([(v(0), None), (v(1), Some(v(0))), (v(2), Some(v(0)))]);
        let f = mgr.create_from_table(&Scope::from_iter([(v(0), 2), (v(1), 2)]), &[0.1, 0.2, 0.3, 0.4], 1.0);
        let g = mgr.create_from_table(&Scope::from_iter([(v(0), 2), (v(2), 2)]), &[0.5, 0.6, 0.7, 0.8], 1.0);
        let p = mgr.apply_product(f, g, &pt);

        // 0.3 * 1.1 + 0.7 * 1.5
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2), (v(2), 2)]);
        let m = mgr.marginalize(p, &scope, &pt);
        assert_close(mgr.branch(m, 0).weight, 1.38);
        let (res, w) = mgr.full_reduce(m);
        assert_eq!(res, vec![Ref::ONE]);
        assert_close(w, 1.38);
    }

    #[test]
    #[should_panic(expected = "Cannot sum products of independent sub-diagrams")]
    fn test_marginalize_branching_root_only() {
        let mgr = NodeManager::default();
        let pt = ParentTree::from_parents([(v(0), None), (v(1), Some(v(0))), (v(2), Some(v(0)))]);
        let f = mgr.create_from_table(&Scope::from_iter([(v(0), 2), (v(1), 2)]), &[0.1, 0.2, 0.3, 0.4], 1.0);
        let g = mgr.create_from_table(&Scope::from_iter([(v(0), 2), (v(2), 2)]), &[0.5, 0.6, 0.7, 0.8], 1.0);
        let p = mgr.apply_product(f, g, &pt);
        mgr.marginalize(p, &Scope::single(v(0), 2), &pt);
    }

    #[test]
    fn test_untouched_variables() {
        let mgr = NodeManager::default();
        let pt = ParentTree::chain(&[v(0)]);
        let f = mgr.create_from_table(&Scope::single(v(0), 2), &[0.1, 0.9], 1.0);
        assert_eq!(mgr.marginalize(f, &Scope::single(v(5), 2), &pt), f);
    }
}
