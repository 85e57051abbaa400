use std::collections::HashMap;

use log::debug;

use crate::manager::NodeManager;
use crate::node::{AndNode, MetaNode};
use crate::reference::Ref;
use crate::utils::MyHash;

impl NodeManager {
    /// Collapse redundant OR-nodes below (and including) `node`.
    ///
    /// Returns the sub-diagrams replacing `node` together with a weight the
    /// caller must fold into its own AND-node. A non-redundant node is
    /// rewritten in place and comes back as `([node'], 1.0)`, where `node'` is
    /// either `node` or an equal canonical node. A redundant node is dropped
    /// from the unique table and replaced by the children of its single
    /// distinct branch.
    ///
    /// Reducing a reduced diagram yields the same diagram.
    pub fn full_reduce(&self, node: Ref) -> (Vec<Ref>, f64) {
        debug!("full_reduce(node = {})", node);
        let mut memo = HashMap::new();
        let res = self.reduce_rec(node, &mut memo);
        debug!("full_reduce: {} -> {:?} x {}", node, res.0, res.1);
        res
    }

    fn reduce_rec(&self, node: Ref, memo: &mut HashMap<Ref, (Vec<Ref>, f64)>) -> (Vec<Ref>, f64) {
        if node.is_terminal() {
            return (vec![node], 1.0);
        }
        if let Some(res) = memo.get(&node) {
            return res.clone();
        }

        let meta = self.node(node);
        let mut branches = Vec::with_capacity(meta.children().len());
        for and in meta.children() {
            let mut weight = and.weight;
            let mut children = Vec::new();
            for &c in &and.children {
                let (sub, w) = self.reduce_rec(c, memo);
                weight *= w;
                children.extend(sub);
            }
            branches.push(normalize(weight, children));
        }

        let tolerance = self.config().tolerance;
        let reduced = MetaNode::new(meta.var(), meta.card(), branches, meta.weight());

        let res = if reduced.is_redundant(tolerance) {
            debug!("full_reduce: {} is redundant", node);
            self.unique.borrow_mut().remove(meta.hash(), node);
            let first = &reduced.children()[0];
            (first.children.clone(), meta.weight() * first.weight)
        } else {
            (vec![self.rewrite(node, &meta, reduced)], 1.0)
        };

        memo.insert(node, res.clone());
        res
    }

    /// Replace the content of `node` by `reduced` and re-canonicalise it.
    fn rewrite(&self, node: Ref, old: &MetaNode, reduced: MetaNode) -> Ref {
        self.unique.borrow_mut().remove(old.hash(), node);

        let hash = reduced.hash();
        if let Some(existing) = self.find_canonical(hash, &reduced, Some(node)) {
            debug!("full_reduce: {} now equals {}", node, existing);
            self.storage.borrow_mut().get_mut(node.index()).set_children(reduced.children().to_vec());
            return existing;
        }

        self.storage.borrow_mut().get_mut(node.index()).set_children(reduced.children().to_vec());
        self.unique.borrow_mut().insert(hash, node);
        node
    }
}

/// Canonical child list: `One` factors are dropped, a `Zero` factor absorbs
/// the rest, and the handles are sorted.
pub(crate) fn normalize(weight: f64, mut children: Vec<Ref>) -> AndNode {
    if children.contains(&Ref::ZERO) {
        return AndNode::new(weight, vec![Ref::ZERO]);
    }
    children.retain(|r| !r.is_one());
    if children.is_empty() {
        children.push(Ref::ONE);
    }
    children.sort();
    AndNode::new(weight, children)
}
