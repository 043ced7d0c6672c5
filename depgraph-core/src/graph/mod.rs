//! Dependency Graph
//!
//! This module implements dependency nodes and the traversals layered on top
//! of them.
//!
//! # Overview
//!
//! The graph is a directed graph where:
//!
//! - Nodes wrap an arbitrary element plus a name and a type tag
//! - Edges represent dependencies: if A depends on B, A holds an edge to B
//! - Each node also keeps a parent back-reference to the node it most
//!   recently started depending on
//!
//! There is no central graph object. The graph is whatever is reachable from
//! the node you hold, so searches and depth are methods on the node.
//!
//! # Design Decisions
//!
//! 1. Nodes are shared handles (`Arc` + `RwLock`), so one node can be a
//!    dependency of many others without copying.
//!
//! 2. Name matching uses an explicit [`TypeTag`] given at construction rather
//!    than inspecting the element.
//!
//! 3. Cycles are allowed in the structure but detected by traversals that
//!    cannot finish on them (depth and ancestor search).

mod node;
mod tag;
mod traversal;

pub use node::{DependencyNode, NodeBuilder, NodeId};
pub use traversal::Descendants;
pub use tag::{TagForm, TypeTag};
