//! Combination of diagrams under product or sum.
//!
//! [`NodeManager::apply`] combines a left diagram with a list of right
//! co-roots, branch by branch on the variable of the left root. Inside every
//! branch the sub-diagrams coming from both sides are split into independent
//! groups: two sub-diagrams end up in the same group only if the pseudo-tree
//! places them under a common ancestor among the variables present. Each group
//! is then combined recursively and the group results become the children of
//! the new AND-node.
//!
//! Product is exact for any pseudo-tree. Sum pushes each side's accumulated
//! weight down into its sub-diagram, lifting a constant side into a compacted
//! node over the other side's variable. A sum is only representable when each
//! side holds at most one sub-diagram and both fall under one pseudo-tree
//! path; anything else panics.

use std::collections::{BTreeMap, HashSet};

use log::{debug, trace};

use crate::manager::{NodeManager, Operator};
use crate::node::AndNode;
use crate::pseudo_tree::PseudoTree;
use crate::reference::Ref;
use crate::types::Var;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ApplyKey {
    op: Operator,
    lhs: Ref,
    rhs: Vec<Ref>,
    weight: u64,
}

/// Right-hand side of a single branch combination.
#[derive(Debug, Clone)]
pub(crate) enum Partner {
    /// The branch of a right co-root over the same variable.
    Aligned(AndNode),
    /// Right co-roots over other variables, pushed down unchanged.
    Pushed(Vec<Ref>),
}

impl NodeManager {
    pub fn apply_product(&self, lhs: Ref, rhs: Ref, pt: &dyn PseudoTree) -> Ref {
        self.apply(lhs, &[rhs], Operator::Product, pt, 1.0)
    }

    pub fn apply_sum(&self, lhs: Ref, rhs: Ref, pt: &dyn PseudoTree) -> Ref {
        self.apply(lhs, &[rhs], Operator::Sum, pt, 1.0)
    }

    /// Combine `lhs` with the co-roots `rhs` under `op`, scaling the result
    /// by `weight`.
    ///
    /// # Panics
    ///
    /// Panics if an aligned right co-root has a different cardinality than
    /// `lhs`.
    pub fn apply(&self, lhs: Ref, rhs: &[Ref], op: Operator, pt: &dyn PseudoTree, weight: f64) -> Ref {
        debug!("apply(op = {:?}, lhs = {}, rhs = {:?}, weight = {})", op, lhs, rhs, weight);

        match op {
            Operator::Product => {
                if lhs.is_zero() || rhs.contains(&Ref::ZERO) {
                    debug!("apply: 0 * ... => 0");
                    return Ref::ZERO;
                }
                if rhs.is_empty() {
                    return self.scaled(lhs, weight);
                }
                if lhs.is_one() {
                    let rest: Vec<Ref> = rhs.iter().copied().filter(|r| !r.is_one()).collect();
                    return match rest.split_first() {
                        None => Ref::ONE,
                        Some((&first, others)) => self.apply(first, others, op, pt, weight),
                    };
                }
            }
            Operator::Sum => {
                if rhs.is_empty() {
                    return self.scaled(lhs, weight);
                }
                if lhs.is_one() {
                    debug!("apply: 1 + ... => 1");
                    return Ref::ONE;
                }
                if lhs.is_zero() {
                    return self.apply(rhs[0], &rhs[1..], op, pt, weight);
                }
                if rhs.contains(&Ref::ZERO) {
                    let rest: Vec<Ref> = rhs.iter().copied().filter(|r| !r.is_zero()).collect();
                    return self.apply(lhs, &rest, op, pt, weight);
                }
            }
        }

        let mut sorted = rhs.to_vec();
        sorted.sort();
        let key = ApplyKey {
            op,
            lhs,
            rhs: sorted,
            weight: weight.to_bits(),
        };
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            debug!("cache: apply({:?}, {}, {:?}) -> {}", op, lhs, rhs, res);
            return res;
        }

        let node = self.node(lhs);
        let (var, card) = (node.var(), node.card());

        let aligned = match op {
            Operator::Product => rhs.iter().position(|&r| self.variable(r) == Some(var)),
            Operator::Sum => {
                if rhs.len() == 1 && self.variable(rhs[0]) == Some(var) {
                    Some(0)
                } else {
                    None
                }
            }
        };
        let partner = aligned.map(|i| self.node(rhs[i]));
        if let Some(p) = &partner {
            assert_eq!(p.card(), card, "Cardinality mismatch on {}", var);
        }
        let others: Vec<Ref> = rhs
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != aligned)
            .map(|(_, &r)| r)
            .collect();
        trace!("apply: var = {}, aligned = {:?}, others = {:?}", var, aligned, others);

        let mut branches = Vec::with_capacity(card);
        for k in 0..card {
            let b = node.branch(k);
            let left = AndNode::new(weight * node.weight() * b.weight, b.children.clone());
            let right = match &partner {
                Some(p) => {
                    let pb = p.branch(k);
                    let mut children = pb.children.clone();
                    children.extend(&others);
                    Partner::Aligned(AndNode::new(p.weight() * pb.weight, children))
                }
                None => Partner::Pushed(rhs.to_vec()),
            };
            branches.push(self.combine_branch(op, left, right, pt));
        }

        let res = self.create_meta_node(var, card, branches, 1.0);
        debug!("computed: apply({:?}, {}, {:?}) -> {}", op, lhs, rhs, res);
        self.cache.borrow_mut().insert(key, res);
        res
    }

    fn scaled(&self, node: Ref, weight: f64) -> Ref {
        if weight == 1.0 || node.is_terminal() {
            node
        } else {
            self.reweigh_nodes(&[node], weight)[0]
        }
    }

    /// Combine one branch of the left side with its right partner.
    pub(crate) fn combine_branch(&self, op: Operator, left: AndNode, partner: Partner, pt: &dyn PseudoTree) -> AndNode {
        match op {
            Operator::Product => {
                let (weight, right) = match partner {
                    Partner::Aligned(r) => (left.weight * r.weight, r.children),
                    Partner::Pushed(rs) => (left.weight, rs),
                };
                if left.contains_zero() || right.contains(&Ref::ZERO) {
                    return AndNode::new(0.0, vec![Ref::ZERO]);
                }
                let lc: Vec<Ref> = left.children.into_iter().filter(|r| !r.is_one()).collect();
                let rc: Vec<Ref> = right.into_iter().filter(|r| !r.is_one()).collect();
                self.combine_groups(op, weight, &lc, &rc, pt)
            }
            Operator::Sum => {
                let right = match partner {
                    Partner::Aligned(r) => r,
                    Partner::Pushed(rs) => AndNode::new(1.0, rs),
                };
                let (a, lc) = Self::summand(left);
                let (b, rc) = Self::summand(right);
                assert!(
                    lc.len() <= 1 && rc.len() <= 1,
                    "Cannot sum products of independent sub-diagrams ({:?} + {:?})",
                    lc,
                    rc
                );

                let open = match (lc.first(), rc.first()) {
                    (None, None) => {
                        let weight = a + b;
                        if weight == 0.0 {
                            return AndNode::new(0.0, vec![Ref::ZERO]);
                        }
                        return AndNode::new(weight, vec![Ref::ONE]);
                    }
                    (Some(&r), _) | (None, Some(&r)) => r,
                };
                let lc = self.distribute(a, &lc, open);
                let rc = self.distribute(b, &rc, open);
                self.combine_groups(op, 1.0, &lc, &rc, pt)
            }
        }
    }

    /// Weight and non-terminal children of one side of a sum.
    fn summand(and: AndNode) -> (f64, Vec<Ref>) {
        let weight = and.effective_weight();
        if weight == 0.0 {
            return (0.0, Vec::new());
        }
        (weight, and.children.into_iter().filter(|r| !r.is_terminal()).collect())
    }

    /// Sub-diagrams carrying `weight * Π children`, ready to be summed with a
    /// diagram rooted at `open`.
    ///
    /// The weight goes into the single child when there is one. A constant
    /// side becomes a compacted node over the variable of `open`.
    fn distribute(&self, weight: f64, children: &[Ref], open: Ref) -> Vec<Ref> {
        if weight == 0.0 {
            return Vec::new();
        }
        match children.first() {
            Some(&c) => self.reweigh_nodes(&[c], weight),
            None => {
                let node = self.node(open);
                let branch = AndNode::new(weight, vec![Ref::ONE]);
                vec![self.create_meta_node(node.var(), node.card(), vec![branch], 1.0)]
            }
        }
    }

    fn combine_groups(&self, op: Operator, weight: f64, lc: &[Ref], rc: &[Ref], pt: &dyn PseudoTree) -> AndNode {
        if lc.is_empty() && rc.is_empty() {
            return AndNode::new(weight, vec![Ref::ONE]);
        }

        let groups = self.partition(lc, rc, pt);
        assert!(
            op == Operator::Product || groups.len() <= 1,
            "Cannot sum sub-diagrams over independent subtrees ({:?} + {:?})",
            lc,
            rc
        );

        let mut children = Vec::new();
        for (g, rest) in groups {
            let res = self.apply(g, &rest, op, pt, 1.0);
            if res.is_zero() {
                trace!("combine: group of {} is zero", g);
                return AndNode::new(0.0, vec![Ref::ZERO]);
            }
            children.push(res);
        }

        let non_terminal = children.iter().any(|r| !r.is_terminal());
        if non_terminal {
            children.retain(|r| !r.is_one());
        } else {
            children = vec![Ref::ONE];
        }
        children.sort();

        // Sum weights were distributed into the children already.
        let weight = if op == Operator::Sum && non_terminal { 1.0 } else { weight };
        AndNode::new(weight, children)
    }

    /// Split sub-diagrams into independent groups.
    ///
    /// Every sub-diagram is keyed by its highest ancestor among the variables
    /// present on either side. The head of a group is the sub-diagram over
    /// that ancestor (left side first); terminals form one trailing group.
    pub(crate) fn partition(&self, lc: &[Ref], rc: &[Ref], pt: &dyn PseudoTree) -> Vec<(Ref, Vec<Ref>)> {
        let items: Vec<(Ref, Option<Var>)> = lc.iter().chain(rc).map(|&r| (r, self.variable(r))).collect();
        let present: HashSet<Var> = items.iter().filter_map(|&(_, v)| v).collect();

        let mut groups: BTreeMap<Var, (Option<Ref>, Vec<Ref>)> = BTreeMap::new();
        let mut terminals = Vec::new();
        for (r, var) in items {
            let Some(var) = var else {
                terminals.push(r);
                continue;
            };
            let mut root = var;
            while let Some(p) = pt.embedded_parent(root, &present) {
                root = p;
            }
            let (head, rest) = groups.entry(root).or_default();
            if var == root && head.is_none() {
                *head = Some(r);
            } else {
                rest.push(r);
            }
        }

        let mut res: Vec<(Ref, Vec<Ref>)> = groups
            .into_values()
            .filter_map(|(head, mut rest)| match head {
                Some(h) => Some((h, rest)),
                None if !rest.is_empty() => {
                    let h = rest.remove(0);
                    Some((h, rest))
                }
                None => None,
            })
            .collect();
        if let Some((&first, others)) = terminals.split_first() {
            res.push((first, others.to_vec()));
        }
        trace!("partition: {} groups", res.len());
        res
    }
}
