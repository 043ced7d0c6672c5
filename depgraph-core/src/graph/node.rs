//! Graph Nodes
//!
//! This module defines the dependency node and its identifier.
//!
//! A [`DependencyNode`] is a handle: cloning it yields another handle to the
//! same node, and equality compares identity, not the wrapped element. Two
//! nodes wrapping equal elements are distinct.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::tag::{TagForm, TypeTag};

/// Unique identifier for a node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(super) type Dependencies<T> = SmallVec<[DependencyNode<T>; 4]>;

/// Mutable state behind a node handle.
struct NodeInner<T> {
    element: T,
    name: Option<String>,
    tag: TypeTag,

    /// Nodes that this node depends on, in insertion order.
    dependencies: Dependencies<T>,

    /// The node most recently passed to `depends_on`.
    /// Weak because it is always also held by `dependencies`.
    parent: Option<WeakNode<T>>,
}

impl<T> Drop for NodeInner<T> {
    /// Releases dependencies with a work list. The default drop would recurse
    /// once per link and overflow the stack on long chains.
    fn drop(&mut self) {
        let mut pending: Vec<DependencyNode<T>> = self.dependencies.drain(..).collect();

        while let Some(node) = pending.pop() {
            // Shared nodes are left to their other holders.
            if let Some(lock) = Arc::into_inner(node.inner) {
                let mut inner = lock.into_inner();
                pending.extend(inner.dependencies.drain(..));
            }
        }
    }
}

struct WeakNode<T> {
    id: NodeId,
    inner: Weak<RwLock<NodeInner<T>>>,
}

impl<T> WeakNode<T> {
    fn upgrade(&self) -> Option<DependencyNode<T>> {
        self.inner.upgrade().map(|inner| DependencyNode { id: self.id, inner })
    }
}

/// A node in the dependency graph.
///
/// Wraps an element of type `T` together with an optional name, a
/// [`TypeTag`], the nodes it depends on and a back-reference to the node it
/// most recently started depending on.
///
/// # Cycles
///
/// Edges that close a cycle are accepted. Dependencies are held strongly, so
/// a cycle keeps its nodes alive until the host removes one of its edges.
/// Traversals detect cycles instead of recursing forever; see
/// [`DependencyNode::depth`] and [`DependencyNode::parent_by_name`].
pub struct DependencyNode<T> {
    /// Copied out of the lock so identity checks never block.
    id: NodeId,
    inner: Arc<RwLock<NodeInner<T>>>,
}

impl<T> DependencyNode<T> {
    /// Create a new untagged, unnamed node.
    pub fn new(element: T) -> Self {
        Self::builder(element).build()
    }

    /// Create a new untagged node with a name.
    pub fn named(element: T, name: impl Into<String>) -> Self {
        Self::builder(element).name(name).build()
    }

    /// Create a new node with the given type tag.
    pub fn tagged(element: T, tag: impl Into<TypeTag>) -> Self {
        Self::builder(element).tag(tag).build()
    }

    /// Create a new node tagged with the name of the marker type `K`.
    ///
    /// ```
    /// use depgraph_core::graph::DependencyNode;
    ///
    /// struct LandingPageNode;
    ///
    /// let node = DependencyNode::of_type::<LandingPageNode>("home");
    /// assert_eq!(node.tag().short(), "LandingPageNode");
    /// ```
    pub fn of_type<K: ?Sized>(element: T) -> Self {
        Self::builder(element).of_type::<K>().build()
    }

    /// Start building a node around `element`.
    pub fn builder(element: T) -> NodeBuilder<T> {
        NodeBuilder {
            element,
            name: None,
            tag: TypeTag::default(),
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's type tag.
    pub fn tag(&self) -> TypeTag {
        self.inner.read().tag.clone()
    }

    /// Get a clone of the wrapped element.
    pub fn element(&self) -> T
    where
        T: Clone,
    {
        self.inner.read().element.clone()
    }

    /// Run `f` against the wrapped element without cloning it.
    pub fn with_element<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.read().element)
    }

    /// Replace the wrapped element.
    pub fn set_element(&self, element: T) -> &Self {
        self.inner.write().element = element;
        self
    }

    /// Get the node's name, if any.
    pub fn name(&self) -> Option<String> {
        self.inner.read().name.clone()
    }

    /// Set the node's name.
    pub fn set_name(&self, name: impl Into<String>) -> &Self {
        self.inner.write().name = Some(name.into());
        self
    }

    /// Remove the node's name.
    pub fn clear_name(&self) -> &Self {
        self.inner.write().name = None;
        self
    }

    /// Record that this node depends on `other`.
    ///
    /// The edge is added only if `other` is not already a dependency. The
    /// parent back-reference is set to `other` in both cases, so repeating
    /// an existing edge still moves the parent.
    pub fn depends_on(&self, other: &DependencyNode<T>) {
        let mut inner = self.inner.write();

        if inner.dependencies.iter().any(|dep| dep == other) {
            tracing::trace!(node = %self.id, dependency = %other.id, "dependency already present");
        } else {
            inner.dependencies.push(other.clone());
            tracing::trace!(node = %self.id, dependency = %other.id, "added dependency");
        }

        inner.parent = Some(other.downgrade());
    }

    /// Remove `other` from this node's dependencies.
    ///
    /// If the parent pointed at `other`, it moves to the most recently added
    /// remaining dependency. Returns whether an edge was removed.
    pub fn remove_dependency(&self, other: &DependencyNode<T>) -> bool {
        let mut inner = self.inner.write();

        let Some(index) = inner.dependencies.iter().position(|dep| dep == other) else {
            return false;
        };
        inner.dependencies.remove(index);

        if inner.parent.as_ref().is_some_and(|parent| parent.id == other.id) {
            let fallback = inner.dependencies.last().map(DependencyNode::downgrade);
            inner.parent = fallback;
        }

        tracing::trace!(node = %self.id, dependency = %other.id, "removed dependency");
        true
    }

    /// Get all dependencies, in the order they were added.
    pub fn dependencies(&self) -> Vec<DependencyNode<T>> {
        self.inner.read().dependencies.to_vec()
    }

    /// Check whether `other` is a direct dependency.
    pub fn has_dependency(&self, other: &DependencyNode<T>) -> bool {
        self.inner.read().dependencies.iter().any(|dep| dep == other)
    }

    /// Number of direct dependencies.
    pub fn dependency_count(&self) -> usize {
        self.inner.read().dependencies.len()
    }

    /// Get the node this node most recently started depending on.
    pub fn parent(&self) -> Option<DependencyNode<T>> {
        self.inner.read().parent.as_ref().and_then(WeakNode::upgrade)
    }

    /// Copy of the dependency list, taken so callers can descend without
    /// holding this node's lock.
    pub(super) fn dependency_snapshot(&self) -> Dependencies<T> {
        self.inner.read().dependencies.clone()
    }

    pub(super) fn tag_matches(&self, name: &str, form: TagForm) -> bool {
        self.inner.read().tag.matches(name, form)
    }

    fn downgrade(&self) -> WeakNode<T> {
        WeakNode {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<T> Clone for DependencyNode<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for DependencyNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for DependencyNode<T> {}

impl<T> Hash for DependencyNode<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for DependencyNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        let dependencies: Vec<NodeId> = inner.dependencies.iter().map(|dep| dep.id).collect();

        f.debug_struct("DependencyNode")
            .field("id", &self.id)
            .field("tag", &inner.tag)
            .field("name", &inner.name)
            .field("element", &inner.element)
            .field("dependencies", &dependencies)
            .field("parent", &inner.parent.as_ref().map(|parent| parent.id))
            .finish()
    }
}

/// Builder for [`DependencyNode`].
#[derive(Debug)]
pub struct NodeBuilder<T> {
    element: T,
    name: Option<String>,
    tag: TypeTag,
}

impl<T> NodeBuilder<T> {
    /// Set the node's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the node's type tag.
    pub fn tag(mut self, tag: impl Into<TypeTag>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Tag the node with the name of the marker type `K`.
    pub fn of_type<K: ?Sized>(mut self) -> Self {
        self.tag = TypeTag::of::<K>();
        self
    }

    /// Finish the node. A fresh [`NodeId`] is assigned here.
    pub fn build(self) -> DependencyNode<T> {
        DependencyNode {
            id: NodeId::new(),
            inner: Arc::new(RwLock::new(NodeInner {
                element: self.element,
                name: self.name,
                tag: self.tag,
                dependencies: SmallVec::new(),
                parent: None,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn new_node_is_empty() {
        let node = DependencyNode::new(5);
        assert_eq!(node.element(), 5);
        assert!(node.name().is_none());
        assert!(node.tag().is_empty());
        assert!(node.dependencies().is_empty());
        assert!(node.parent().is_none());
    }

    #[test]
    fn accessors_chain() {
        let node = DependencyNode::named("a", "first");
        node.set_name("second").set_element("b");

        assert_eq!(node.name().as_deref(), Some("second"));
        assert_eq!(node.element(), "b");

        node.clear_name();
        assert!(node.name().is_none());
    }

    #[test]
    fn id_is_stable_across_mutation_and_clones() {
        let node = DependencyNode::new(1);
        let id = node.id();
        node.set_element(2).set_name("x");

        assert_eq!(node.id(), id);
        assert_eq!(node.clone().id(), id);
    }

    #[test]
    fn equality_is_by_identity() {
        let a = DependencyNode::new(1);
        let b = DependencyNode::new(1);

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn redundant_edge_moves_parent_only() {
        let node = DependencyNode::new(());
        let a = DependencyNode::new(());
        let b = DependencyNode::new(());

        node.depends_on(&a);
        node.depends_on(&b);
        node.depends_on(&a);

        assert_eq!(node.dependencies(), vec![a.clone(), b.clone()]);
        assert_eq!(node.parent(), Some(a));
    }

    #[test]
    fn self_dependency_is_accepted() {
        let node = DependencyNode::new(());
        node.depends_on(&node);

        assert!(node.has_dependency(&node));
        assert_eq!(node.parent(), Some(node.clone()));

        // Break the cycle so the node can be freed.
        assert!(node.remove_dependency(&node));
        assert!(node.parent().is_none());
    }

    #[test]
    fn removing_parent_falls_back_to_latest_edge() {
        let node = DependencyNode::new(());
        let a = DependencyNode::new(());
        let b = DependencyNode::new(());
        let c = DependencyNode::new(());

        node.depends_on(&a);
        node.depends_on(&b);
        node.depends_on(&c);

        assert!(node.remove_dependency(&c));
        assert_eq!(node.parent(), Some(b.clone()));

        // Removing a non-parent edge leaves the parent alone.
        assert!(node.remove_dependency(&a));
        assert_eq!(node.parent(), Some(b));
        assert_eq!(node.dependency_count(), 1);

        assert!(!node.remove_dependency(&a));
    }

    #[test]
    fn dropping_a_chain_keeps_shared_nodes() {
        let shared = DependencyNode::named((), "shared");
        let root = DependencyNode::new(());
        let mut tail = root.clone();
        for _ in 0..10 {
            let next = DependencyNode::new(());
            tail.depends_on(&next);
            tail = next;
        }
        tail.depends_on(&shared);
        drop(tail);

        drop(root);
        assert_eq!(shared.name().as_deref(), Some("shared"));
        assert_eq!(Arc::strong_count(&shared.inner), 1);
    }

    #[test]
    fn builder_sets_all_fields() {
        struct ArticleNode;

        let node = DependencyNode::builder(vec![1, 2])
            .name("intro")
            .of_type::<ArticleNode>()
            .build();

        assert_eq!(node.name().as_deref(), Some("intro"));
        assert_eq!(node.tag().short(), "ArticleNode");
        assert_eq!(node.with_element(Vec::len), 2);
    }

    #[test]
    fn debug_lists_dependency_ids() {
        let root = DependencyNode::tagged(0, "RootNode");
        let dep = DependencyNode::new(1);
        root.depends_on(&dep);

        let out = format!("{root:?}");
        assert!(out.contains("RootNode"));
        assert!(out.contains(&format!("{:?}", dep.id())));
    }
}
