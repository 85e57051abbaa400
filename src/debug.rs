//! Text dumps for inspecting diagrams.
//!
//! These are primarily useful in tests and during development. The format is
//! meant for humans and may change.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write;

use crate::manager::NodeManager;
use crate::reference::Ref;

impl NodeManager {
    /// Indented dump of the diagram rooted at `root`.
    ///
    /// Every OR-node is printed once with its weight and the ids of the OR-nodes
    /// pointing at it; later occurrences are printed as `-> @id`.
    ///
    /// ```text
    /// @4 x0 w=1 parents=[]
    ///   [0] w=1 -> @2
    ///     @2 x1 w=1 parents=[@4]
    ///       [0] w=0.1 -> 1
    /// ...
    /// ```
    pub fn dump(&self, root: Ref) -> Result<String, std::fmt::Error> {
        let parents = self.parent_map(root);
        let mut out = String::new();
        let mut seen = HashSet::new();
        self.dump_rec(root, 0, &parents, &mut seen, &mut out)?;
        Ok(out)
    }

    fn dump_rec(
        &self,
        node: Ref,
        depth: usize,
        parents: &BTreeMap<Ref, BTreeSet<Ref>>,
        seen: &mut HashSet<Ref>,
        out: &mut String,
    ) -> std::fmt::Result {
        let indent = "  ".repeat(depth);
        if node.is_terminal() {
            return writeln!(out, "{}{}", indent, node);
        }
        if !seen.insert(node) {
            return writeln!(out, "{}-> {}", indent, node);
        }

        let meta = self.node(node);
        let ps: Vec<String> = parents
            .get(&node)
            .map(|s| s.iter().map(|p| p.to_string()).collect())
            .unwrap_or_default();
        writeln!(
            out,
            "{}{} {} w={} parents=[{}]",
            indent,
            node,
            meta.var(),
            meta.weight(),
            ps.join(", ")
        )?;

        for (k, and) in meta.children().iter().enumerate() {
            let ids: Vec<String> = and.children.iter().map(|c| c.to_string()).collect();
            writeln!(out, "{}  [{}] w={} -> {}", indent, k, and.weight, ids.join(" "))?;
            for &c in &and.children {
                if !c.is_terminal() {
                    self.dump_rec(c, depth + 2, parents, seen, out)?;
                }
            }
        }
        Ok(())
    }

    /// Reverse adjacency of the diagram: the OR-nodes pointing at each node.
    fn parent_map(&self, root: Ref) -> BTreeMap<Ref, BTreeSet<Ref>> {
        let mut res: BTreeMap<Ref, BTreeSet<Ref>> = BTreeMap::new();
        let storage = self.storage.borrow();
        for p in self.descendants([root]) {
            for and in storage.get(p.index()).children() {
                for &c in &and.children {
                    if !c.is_terminal() {
                        res.entry(c).or_default().insert(p);
                    }
                }
            }
        }
        res
    }

    /// One line per canonical node, ordered by handle.
    pub fn dump_unique_table(&self) -> Result<String, std::fmt::Error> {
        let mut nodes: Vec<Ref> = self.unique.borrow().iter().collect();
        nodes.sort();

        let mut out = String::new();
        writeln!(out, "unique table: {} nodes", nodes.len())?;
        for r in nodes {
            let meta = self.node(r);
            let branches: Vec<String> = meta
                .children()
                .iter()
                .map(|and| {
                    let ids: Vec<String> = and.children.iter().map(|c| c.to_string()).collect();
                    format!("{}:[{}]", and.weight, ids.join(" "))
                })
                .collect();
            writeln!(out, "{} {} w={} {}", r, meta.var(), meta.weight(), branches.join(" "))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use crate::types::Var;

    #[test]
    fn test_dump() {
        let mgr = NodeManager::default();
        let scope = Scope::from_iter([(Var::new(0), 2), (Var::new(1), 2)]);
        let f = mgr.create_from_table(&scope, &[0.5, 0.5, 0.5, 0.5], 1.0);
        let dump = mgr.dump(f).unwrap();

        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], format!("{} x0 w=1 parents=[]", f));
        // The shared `x1` node is expanded once, then referenced.
        assert_eq!(dump.matches(" x1 w=1 parents=[").count(), 1);
        assert_eq!(dump.matches("    -> @").count(), 1);
        assert!(dump.contains(&format!("parents=[{}]", f)));
    }

    #[test]
    fn test_dump_terminal() {
        let mgr = NodeManager::default();
        assert_eq!(mgr.dump(Ref::ONE).unwrap(), "1\n");
    }

    #[test]
    fn test_dump_unique_table() {
        let mgr = NodeManager::default();
        mgr.create_from_table(&Scope::single(Var::new(3), 2), &[0.25, 0.0], 1.0);
        let dump = mgr.dump_unique_table().unwrap();
        assert!(dump.starts_with("unique table: 1 nodes\n"));
        assert!(dump.contains("x3 w=1 0.25:[1] 0:[0]"));
    }
}
