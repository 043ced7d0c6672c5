//! Depgraph Core
//!
//! This crate provides a small dependency-node abstraction for host
//! applications that need to track which things depend on which others.
//! It implements:
//!
//! - Nodes wrapping arbitrary elements, with names and type tags
//! - Ordered, duplicate-free dependency edges
//! - A parent back-reference to the most recently added dependency
//! - Depth, descendant-by-name and ancestor-by-name lookups
//!
//! # Architecture
//!
//! - `graph`: Nodes, type tags and traversals
//! - `error`: Errors reported by traversals
//!
//! # Example
//!
//! ```rust
//! use depgraph_core::graph::DependencyNode;
//!
//! let page = DependencyNode::tagged("home", "site::LandingPageNode");
//! let section = DependencyNode::tagged("hero", "site::SectionNode");
//! let article = DependencyNode::tagged("post", "site::ArticleNode");
//!
//! section.depends_on(&page);
//! article.depends_on(&section);
//!
//! assert_eq!(article.depth(), Ok(2));
//! assert_eq!(article.dependencies_by_name("LandingPage"), vec![page.clone()]);
//! assert_eq!(article.parent_by_name("Section"), Ok(Some(section)));
//! ```

pub mod error;
pub mod graph;

pub use error::{GraphError, Result};
pub use graph::{Descendants, DependencyNode, NodeBuilder, NodeId, TagForm, TypeTag};
