//! Diagram to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated graph alternates two kinds of vertices:
//! - **OR vertices** (one per unique OR-node), labelled by the variable.
//! - **AND vertices** (one per branch of an OR-node), labelled by the value
//!   index the branch stands for (`*` for a compacted branch shared by all
//!   values).
//!
//! An OR→AND edge carries the branch weight (times the OR-weight, if that is
//! not 1). AND→OR edges point to the sub-diagrams of the conjunction. The
//! terminals `0` and `1` are squares at the bottom.
//!
//! # Examples
//!
//! ```
//! use aomdd_rs::manager::NodeManager;
//! use aomdd_rs::scope::Scope;
//! use aomdd_rs::types::Var;
//!
//! let mgr = NodeManager::default();
//! let scope = Scope::from_iter([(Var::new(0), 2), (Var::new(1), 2)]);
//! let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 1.0);
//!
//! let dot = mgr.to_dot(&[f]).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;

use crate::manager::NodeManager;
use crate::reference::Ref;
use crate::types::Var;

/// Configuration options for DOT output generation.
///
/// ```
/// use aomdd_rs::dot::DotConfig;
///
/// let config = DotConfig {
///     or_shape: "ellipse",
///     precision: 2,
///     ..DotConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for OR vertices (default: "circle")
    pub or_shape: &'static str,
    /// Shape for AND vertices (default: "box")
    pub and_shape: &'static str,
    /// Shape for terminal vertices (default: "square")
    pub terminal_shape: &'static str,
    /// Style for edges from AND vertices to sub-diagrams (default: "solid")
    pub child_edge_style: &'static str,
    /// Style for edges into the `0` terminal (default: "dashed")
    pub zero_edge_style: &'static str,
    /// Digits after the decimal point in weight labels (default: 4)
    pub precision: usize,
    /// Whether to use HTML labels for subscripts (default: true)
    pub use_html_labels: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            or_shape: "circle",
            and_shape: "box",
            terminal_shape: "square",
            child_edge_style: "solid",
            zero_edge_style: "dashed",
            precision: 4,
            use_html_labels: true,
        }
    }
}

impl NodeManager {
    /// Converts diagrams to DOT format.
    ///
    /// Nodes shared by several roots are displayed once.
    pub fn to_dot(&self, roots: &[Ref]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    /// Converts diagrams to DOT format with custom configuration.
    pub fn to_dot_with_config(&self, roots: &[Ref], config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut dot = String::new();
        writeln!(dot, "graph {{")?;
        writeln!(dot, "node [shape={}];", config.or_shape)?;

        // Terminal nodes (0 and 1)
        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "0 [shape={}, label=\"0\"];", config.terminal_shape)?;
        writeln!(dot, "1 [shape={}, label=\"1\"];", config.terminal_shape)?;
        writeln!(dot, "}}")?;

        let mut nodes: Vec<Ref> = self.descendants(roots.iter().copied()).into_iter().collect();
        nodes.sort();

        // OR vertices grouped by variable
        let mut levels = BTreeMap::<Var, Vec<Ref>>::new();
        for &r in &nodes {
            levels.entry(self.node(r).var()).or_default().push(r);
        }
        for (var, level) in &levels {
            writeln!(dot, "{{ rank=same")?;
            for r in level {
                let label = if config.use_html_labels {
                    format!("<x<SUB>{}</SUB>>", var.id())
                } else {
                    format!("\"{}\"", var)
                };
                writeln!(dot, "{} [label={}];", r.get(), label)?;
            }
            writeln!(dot, "}}")?;
        }

        // AND vertices and edges
        for &r in &nodes {
            let node = self.node(r);
            let compacted = node.children().len() == 1 && node.card() > 1;
            for (k, and) in node.children().iter().enumerate() {
                let id = format!("a{}_{}", r.get(), k);
                let label = if compacted { "*".to_string() } else { k.to_string() };
                writeln!(dot, "{} [shape={}, label=\"{}\"];", id, config.and_shape, label)?;

                let weight = node.weight() * and.weight;
                writeln!(dot, "{} -- {} [label=\"{:.*}\"];", r.get(), id, config.precision, weight)?;

                for &c in &and.children {
                    let style = if c.is_zero() {
                        config.zero_edge_style
                    } else {
                        config.child_edge_style
                    };
                    writeln!(dot, "{} -- {} [style={}];", id, c.get(), style)?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
