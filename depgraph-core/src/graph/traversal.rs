//! Graph Traversal
//!
//! Depth computation, name-based descendant search and name-based ancestor
//! search over [`DependencyNode`] edges.
//!
//! # Algorithms
//!
//! - **Descendants** are walked depth-first in edge insertion order, visiting
//!   each reachable node once. Results come back in pre-order.
//! - **Ancestors** follow the single parent back-reference upward. This is
//!   one chain decided by the order of `depends_on` calls, not every node
//!   that depends on the receiver.
//! - **Depth** is the length of the longest dependency chain below a node.
//!   Finished sub-results are memoized, so shared sub-graphs are walked once.
//!
//! # Cycles
//!
//! Depth and ancestor search keep the active path and return
//! [`GraphError::CycleDetected`] when it repeats. Descendant search only
//! needs reachability, which a cycle cannot change, so it never fails.
//!
//! Every walk snapshots a node's dependency list and releases the node's
//! lock before descending. Walks keep their own stacks instead of recursing,
//! so chain length is bounded by memory, not by the thread's stack.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexSet;

use super::node::{Dependencies, DependencyNode, NodeId};
use super::tag::TagForm;
use crate::error::{GraphError, Result};

impl<T> DependencyNode<T> {
    /// Length of the longest dependency chain reachable from this node.
    ///
    /// A node without dependencies has depth 0; otherwise the depth is one
    /// more than the deepest direct dependency.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] if a cycle is reachable from
    /// this node, since no finite depth exists then.
    pub fn depth(&self) -> Result<usize> {
        DepthWalk::default().visit(self)
    }

    /// Find every reachable dependency whose short tag matches `name`.
    ///
    /// See [`DependencyNode::dependencies_by_name_with`].
    pub fn dependencies_by_name(&self, name: &str) -> Vec<DependencyNode<T>> {
        self.dependencies_by_name_with(name, TagForm::default())
    }

    /// Find every reachable dependency whose tag, in the given form,
    /// matches `name`.
    ///
    /// A tag matches when it equals `name`, or equals `name` once every
    /// `"Node"` substring is removed. Each node appears at most once even if
    /// several paths lead to it. The receiver is not tested unless a cycle
    /// leads back to it.
    pub fn dependencies_by_name_with(&self, name: &str, form: TagForm) -> Vec<DependencyNode<T>> {
        let matches: Vec<_> = self
            .iter_descendants()
            .filter(|node| node.tag_matches(name, form))
            .collect();

        tracing::trace!(
            node = %self.id(),
            search = name,
            ?form,
            count = matches.len(),
            "searched dependencies by name"
        );
        matches
    }

    /// Find the nearest ancestor whose short tag matches `name`.
    ///
    /// See [`DependencyNode::parent_by_name_with`].
    pub fn parent_by_name(&self, name: &str) -> Result<Option<DependencyNode<T>>> {
        self.parent_by_name_with(name, TagForm::default())
    }

    /// Walk the parent chain upward and return the first ancestor whose tag,
    /// in the given form, matches `name`.
    ///
    /// The receiver is only tested if the chain loops back to it. Returns
    /// `Ok(None)` when the chain ends without a match.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] if the parent chain loops back on
    /// itself without any node on the loop matching.
    pub fn parent_by_name_with(
        &self,
        name: &str,
        form: TagForm,
    ) -> Result<Option<DependencyNode<T>>> {
        let mut chain = IndexSet::new();
        chain.insert(self.id());

        let mut current = self.parent();
        while let Some(node) = current {
            if node.tag_matches(name, form) {
                return Ok(Some(node));
            }
            if let Some(start) = chain.get_index_of(&node.id()) {
                return Err(cycle_error(&chain, start, node.id()));
            }
            chain.insert(node.id());
            current = node.parent();
        }

        Ok(None)
    }

    /// Every node reachable over dependency edges, in pre-order, each once.
    pub fn descendants(&self) -> Vec<DependencyNode<T>> {
        self.iter_descendants().collect()
    }

    /// Lazily walk everything reachable from this node.
    ///
    /// See [`Descendants`].
    pub fn iter_descendants(&self) -> Descendants<T> {
        Descendants {
            visited: HashSet::new(),
            stack: self.dependency_snapshot().into_iter().rev().collect(),
        }
    }

    /// Check whether `target` is reachable from this node.
    pub fn reaches(&self, target: &DependencyNode<T>) -> bool {
        self.iter_descendants().any(|node| node == *target)
    }

    /// Check whether `self.depends_on(other)` would close a cycle.
    pub fn would_cycle(&self, other: &DependencyNode<T>) -> bool {
        self == other || other.reaches(self)
    }
}

/// Depth-first pre-order iterator over the nodes reachable from a node.
///
/// Each node is yielded once, in edge insertion order. A node's dependency
/// list is read when the node is yielded, so edges added to nodes not yet
/// reached are picked up.
pub struct Descendants<T> {
    visited: HashSet<NodeId>,
    stack: Vec<DependencyNode<T>>,
}

impl<T> Iterator for Descendants<T> {
    type Item = DependencyNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if self.visited.insert(node.id()) {
                self.stack.extend(node.dependency_snapshot().into_iter().rev());
                return Some(node);
            }
        }
        None
    }
}

impl<T> fmt::Debug for Descendants<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descendants")
            .field("visited", &self.visited.len())
            .field("pending", &self.stack.len())
            .finish()
    }
}

/// State for a memoized depth computation.
#[derive(Default)]
struct DepthWalk {
    finished: HashMap<NodeId, usize>,

    /// Nodes on the active path, in visiting order.
    path: IndexSet<NodeId>,
}

/// A node whose dependencies are still being measured.
struct DepthFrame<T> {
    id: NodeId,
    pending: <Dependencies<T> as IntoIterator>::IntoIter,
    depth: usize,
}

impl<T> DepthFrame<T> {
    fn new(node: &DependencyNode<T>) -> Self {
        Self {
            id: node.id(),
            pending: node.dependency_snapshot().into_iter(),
            depth: 0,
        }
    }
}

impl DepthWalk {
    /// Post-order walk on an explicit stack, so long chains cannot overflow
    /// the thread's stack.
    fn visit<T>(&mut self, root: &DependencyNode<T>) -> Result<usize> {
        let mut stack = vec![DepthFrame::new(root)];
        self.path.insert(root.id());
        let mut root_depth = 0;

        while let Some(frame) = stack.last_mut() {
            if let Some(dependency) = frame.pending.next() {
                let id = dependency.id();
                if let Some(&depth) = self.finished.get(&id) {
                    frame.depth = frame.depth.max(depth + 1);
                    continue;
                }
                if let Some(start) = self.path.get_index_of(&id) {
                    return Err(cycle_error(&self.path, start, id));
                }
                self.path.insert(id);
                stack.push(DepthFrame::new(&dependency));
                continue;
            }

            let (id, depth) = (frame.id, frame.depth);
            stack.pop();
            self.path.pop();
            self.finished.insert(id, depth);

            match stack.last_mut() {
                Some(dependent) => dependent.depth = dependent.depth.max(depth + 1),
                None => root_depth = depth,
            }
        }

        Ok(root_depth)
    }
}

fn cycle_error(path: &IndexSet<NodeId>, start: usize, repeated: NodeId) -> GraphError {
    let mut cycle: Vec<NodeId> = path.iter().skip(start).copied().collect();
    cycle.push(repeated);

    tracing::debug!(len = cycle.len() - 1, ?cycle, "cycle detected in dependency graph");
    GraphError::CycleDetected { path: cycle }
}
