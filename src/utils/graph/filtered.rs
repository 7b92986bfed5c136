//! Node-filtered graph views.
//!
//! A [`FilteredGraph`] shows the subgraph induced by the nodes that satisfy a set of
//! predicates, without copying any edges. The view keeps the node id space of the
//! underlying graph, so algorithms that size per-node vectors by
//! [`GraphBase::node_count`] work unchanged on it.
//!
//! Filtering a view again with [`FilteredGraph::restrict`] adds a predicate to the same
//! view instead of wrapping it, so repeated restriction never nests.

use std::fmt;

use crate::utils::graph::{
    node::NodeId,
    traits::{GraphBase, Predecessors, Successors},
};

type NodeFilter<'g> = Box<dyn Fn(NodeId) -> bool + 'g>;

/// A view of the subgraph induced by all nodes accepted by every filter.
///
/// Edges are visible only when both endpoints pass. Querying the edges of a node that
/// is filtered out yields nothing.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{subgraph, DirectedGraph, GraphBase, NodeId, Successors};
///
/// let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 1)]);
/// let view = subgraph(&graph, |node| node.index() != 0).restrict(|node| node.index() != 3);
///
/// let visible: Vec<NodeId> = view.node_ids().collect();
/// assert_eq!(visible, vec![NodeId::new(1), NodeId::new(2)]);
/// assert_eq!(view.edge_count(), 1);
/// assert_eq!(view.node_count(), 4);
/// ```
pub struct FilteredGraph<'g, G: ?Sized> {
    inner: &'g G,
    filters: Vec<NodeFilter<'g>>,
}

impl<'g, G: GraphBase + ?Sized> FilteredGraph<'g, G> {
    /// Creates an unfiltered view of `inner`.
    #[must_use]
    pub fn new(inner: &'g G) -> Self {
        FilteredGraph {
            inner,
            filters: Vec::new(),
        }
    }

    /// Narrows the view to nodes that also satisfy `filter`.
    #[must_use]
    pub fn restrict<F>(mut self, filter: F) -> Self
    where
        F: Fn(NodeId) -> bool + 'g,
    {
        self.filters.push(Box::new(filter));
        self
    }

    /// Filters this view again; the same as [`FilteredGraph::restrict`].
    ///
    /// The predicate joins the existing ones, so the result is still a view of the
    /// original graph rather than a view of a view.
    #[must_use]
    pub fn subgraph<F>(self, filter: F) -> Self
    where
        F: Fn(NodeId) -> bool + 'g,
    {
        self.restrict(filter)
    }

    /// Returns the underlying graph.
    #[must_use]
    pub fn inner(&self) -> &'g G {
        self.inner
    }

    /// Checks whether `node` is part of the view.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.inner.node_count() && self.filters.iter().all(|filter| filter(node))
    }
}

impl<G: ?Sized> fmt::Debug for FilteredGraph<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredGraph")
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

impl<G: GraphBase + ?Sized> GraphBase for FilteredGraph<'_, G> {
    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        self.inner.node_ids().filter(|&node| self.contains(node))
    }
}

impl<G: Successors + ?Sized> Successors for FilteredGraph<'_, G> {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        let visible = self.contains(node);
        self.inner
            .successors(node)
            .filter(move |&succ| visible && self.contains(succ))
    }
}

impl<G: Predecessors + ?Sized> Predecessors for FilteredGraph<'_, G> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        let visible = self.contains(node);
        self.inner
            .predecessors(node)
            .filter(move |&pred| visible && self.contains(pred))
    }
}

/// Creates a view of `graph` restricted to the nodes accepted by `filter`.
///
/// Passing an existing view as `graph` wraps it in a second view. To narrow a view in
/// place call [`FilteredGraph::subgraph`] or [`FilteredGraph::restrict`] on it instead.
pub fn subgraph<'g, G, F>(graph: &'g G, filter: F) -> FilteredGraph<'g, G>
where
    G: GraphBase + ?Sized,
    F: Fn(NodeId) -> bool + 'g,
{
    FilteredGraph::new(graph).restrict(filter)
}
