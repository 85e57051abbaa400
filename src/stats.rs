//! Structural queries over the DAG reachable from a root.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt::{Display, Formatter};
use std::mem::size_of;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::manager::NodeManager;
use crate::node::MetaNode;
use crate::reference::Ref;
use crate::scope::Scope;
use crate::types::Var;

/// Size summary of one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramStats {
    pub num_nodes: usize,
    pub num_value_cells: usize,
    pub memory_footprint: usize,
    /// Number of cells of the dense table over the same scope.
    pub table_cells: BigUint,
    pub nodes_per_var: BTreeMap<Var, usize>,
}

impl DiagramStats {
    /// Dense table cells per diagram value cell.
    pub fn compression_ratio(&self) -> f64 {
        if self.num_value_cells == 0 {
            return f64::INFINITY;
        }
        let cells = self.table_cells.to_f64().unwrap_or(f64::INFINITY);
        cells / self.num_value_cells as f64
    }
}

impl Display for DiagramStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "nodes:       {}", self.num_nodes)?;
        writeln!(f, "value cells: {}", self.num_value_cells)?;
        writeln!(f, "table cells: {}", self.table_cells)?;
        writeln!(f, "memory:      {} bytes", self.memory_footprint)?;
        for (var, count) in &self.nodes_per_var {
            writeln!(f, "  {}: {}", var, count)?;
        }
        Ok(())
    }
}

impl NodeManager {
    /// All non-terminal nodes reachable from `nodes`.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<Ref> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from_iter(nodes);

        let storage = self.storage.borrow();
        while let Some(node) = queue.pop_front() {
            if node.is_terminal() {
                continue;
            }
            if visited.insert(node) {
                for and in storage.get(node.index()).children() {
                    queue.extend(and.children.iter().copied());
                }
            }
        }

        visited
    }

    pub fn num_unique_nodes(&self, root: Ref) -> usize {
        self.descendants([root]).len()
    }

    /// Sum of the cardinalities of all reachable nodes.
    pub fn num_value_cells(&self, root: Ref) -> usize {
        let storage = self.storage.borrow();
        self.descendants([root])
            .into_iter()
            .map(|r| storage.get(r.index()).card())
            .sum()
    }

    pub fn nodes_per_var(&self, root: Ref) -> BTreeMap<Var, usize> {
        let storage = self.storage.borrow();
        let mut res = BTreeMap::new();
        for r in self.descendants([root]) {
            *res.entry(storage.get(r.index()).var()).or_insert(0) += 1;
        }
        res
    }

    /// Approximate memory taken by the reachable nodes, in bytes.
    pub fn memory_footprint(&self, root: Ref) -> usize {
        size_of::<MetaNode>() * self.num_unique_nodes(root)
    }

    /// All branches of `node` are structurally equal.
    pub fn is_redundant(&self, node: Ref) -> bool {
        if node.is_terminal() {
            return false;
        }
        self.storage.borrow().get(node.index()).is_redundant(self.config().tolerance)
    }

    pub fn stats(&self, root: Ref, scope: &Scope) -> DiagramStats {
        DiagramStats {
            num_nodes: self.num_unique_nodes(root),
            num_value_cells: self.num_value_cells(root),
            memory_footprint: self.memory_footprint(root),
            table_cells: scope.num_assignments(),
            nodes_per_var: self.nodes_per_var(root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: u32) -> Var {
        Var::new(i)
    }

    #[test]
    fn test_counts() {
        let mgr = NodeManager::default();
        let scope = Scope::from_iter([(v(0), 2), (v(1), 3)]);
        let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.1, 0.2, 0.3], 1.0);

        // Both rows are equal, so the two `x1` nodes are shared.
        assert_eq!(mgr.num_unique_nodes(f), 2);
        assert_eq!(mgr.num_value_cells(f), 5);
        assert_eq!(mgr.nodes_per_var(f), BTreeMap::from([(v(0), 1), (v(1), 1)]));
        assert_eq!(mgr.memory_footprint(f), 2 * size_of::<MetaNode>());
        assert!(mgr.is_redundant(f));
        assert!(!mgr.is_redundant(Ref::ONE));

        assert_eq!(mgr.num_unique_nodes(Ref::ZERO), 0);
        assert!(mgr.descendants([Ref::ONE, Ref::ZERO]).is_empty());
    }

    #[test]
    fn test_stats() {
        let mgr = NodeManager::default();
        let scope = Scope::from_iter([(v(0), 2), (v(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 1.0);
        let stats = mgr.stats(f, &scope);
        assert_eq!(stats.num_nodes, 3);
        assert_eq!(stats.num_value_cells, 6);
        assert_eq!(stats.table_cells, BigUint::from(4u32));
        assert!((stats.compression_ratio() - 4.0 / 6.0).abs() < 1e-12);
        assert!(stats.to_string().contains("x1: 2"));
    }

    #[test]
    fn test_compression_ratio_large_scope() {
        let mgr = NodeManager::default();
        let f = mgr.create_from_table(&Scope::single(v(0), 2), &[0.5, 0.5], 1.0);
        let scope: Scope = (0..100).map(|i| (v(i), 2)).collect();
        let stats = mgr.stats(f, &scope);
        assert_eq!(stats.num_value_cells, 2);
        assert_eq!(stats.compression_ratio(), 2f64.powi(99));
    }
}
