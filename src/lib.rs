//! # aomdd-rs: AND/OR Multi-valued Decision Diagrams in Rust
//!
//! **`aomdd-rs`** compiles discrete factors (dense tables over multi-valued
//! variables) into **AND/OR Multi-valued Decision Diagrams** and combines and
//! eliminates them directly on that compact form, without materializing the
//! joint table.
//!
//! ## What is an AOMDD?
//!
//! An AOMDD alternates two kinds of nodes:
//!
//! - **OR-nodes** decide the value of one variable. They have one branch per
//!   value (or a single branch shared by every value).
//! - **AND-nodes** are the branches. Each one carries a real weight and a list
//!   of independent sub-diagrams, whose values are multiplied together.
//!
//! Independence comes from a **pseudo-tree** over the variables: sub-diagrams
//! over different subtrees never need to be combined, which keeps diagrams
//! small when the model decomposes.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: All operations go through the
//!   [`NodeManager`][crate::manager::NodeManager]. It owns the node arena, the
//!   unique table (hash-consing) and the operation cache.
//! - **Lightweight handles**: nodes are addressed by [`Ref`][crate::reference::Ref]
//!   handles, plain arena indices.
//! - **Explicit tolerance**: weights are compared up to a configurable
//!   tolerance when deduplicating nodes (see [`ManagerConfig`][crate::manager::ManagerConfig]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use aomdd_rs::assignment::Assignment;
//! use aomdd_rs::manager::NodeManager;
//! use aomdd_rs::pseudo_tree::ParentTree;
//! use aomdd_rs::scope::Scope;
//! use aomdd_rs::types::Var;
//!
//! let mgr = NodeManager::default();
//! let (a, b) = (Var::new(0), Var::new(1));
//! let pt = ParentTree::chain(&[a, b]);
//!
//! // f(A, B) as a dense table, last variable fastest
//! let scope = Scope::from_iter([(a, 2), (b, 2)]);
//! let f = mgr.create_from_table(&scope, &[0.1, 0.2, 0.3, 0.4], 1.0);
//!
//! let x = Assignment::from_values(scope.clone(), &[1, 0]);
//! assert_eq!(mgr.evaluate(f, &x), 0.3);
//!
//! // Sum out A, then drop the nodes that no longer matter
//! let g = mgr.marginalize(f, &Scope::single(a, 2), &pt);
//! assert!((mgr.evaluate(g, &x) - 0.4).abs() < 1e-12);
//! let (roots, w) = mgr.full_reduce(g);
//! assert_eq!(roots.len(), 1);
//! assert_eq!(w, 1.0);
//! ```
//!
//! ## Core Components
//!
//! - **[`manager`]**: the [`NodeManager`][crate::manager::NodeManager] and node construction.
//! - **[`apply`]**: product and sum of diagrams.
//! - **[`reduce`]** and **[`marginalize`]**: redundancy removal and variable elimination.
//! - **[`eval`]**: evaluation, sum-product and max-product queries.
//! - **[`dot`]** and **[`debug`]**: visualization and text dumps.

pub mod apply;
pub mod assignment;
pub mod cache;
pub mod debug;
pub mod dot;
pub mod eval;
pub mod manager;
pub mod marginalize;
pub mod node;
pub mod pseudo_tree;
pub mod reduce;
pub mod reference;
pub mod scope;
pub mod stats;
pub mod storage;
pub mod table;
pub mod types;
pub mod utils;
