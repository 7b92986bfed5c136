//! Trait definitions for graph abstractions.
//!
//! The algorithms in [`algorithms`](crate::utils::graph::algorithms) and the
//! [`DjGraph`](crate::analysis::DjGraph) never look at a concrete graph type. They are written
//! against the small traits defined here, so a caller can run them directly on its own
//! control-flow representation, on a [`DirectedGraph`](crate::utils::graph::DirectedGraph),
//! a [`MutableDirectedGraph`](crate::utils::graph::MutableDirectedGraph) or a
//! [`FilteredGraph`](crate::utils::graph::FilteredGraph) view.
//!
//! # Architecture
//!
//! - [`GraphBase`] - Node id space: node count and node iteration
//! - [`Successors`] - Forward edge traversal (outgoing edges)
//! - [`Predecessors`] - Backward edge traversal (incoming edges)
//!
//! Node ids are dense: every graph covers the id space `[0, node_count)`. Views may hide
//! nodes from [`GraphBase::node_ids`] but never shrink the id space, which keeps per-node
//! vectors sized by `node_count` valid for every view of the same graph.

use crate::utils::graph::NodeId;

/// Base trait providing the node id space of a graph.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{DirectedGraph, GraphBase};
///
/// let graph = DirectedGraph::from_edges(3, [(0, 1)]);
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.node_ids().count(), 3);
/// ```
pub trait GraphBase {
    /// Returns the size of the node id space.
    ///
    /// This count includes all nodes regardless of their connectivity. For filtered
    /// views it is the size of the underlying graph.
    fn node_count(&self) -> usize;

    /// Returns an iterator over all node identifiers that are part of the graph.
    ///
    /// The iteration order is by ascending `NodeId` index.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs that support forward edge traversal.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{DirectedGraph, NodeId, Successors};
///
/// let graph = DirectedGraph::from_edges(3, [(0, 1), (0, 2)]);
/// let successors: Vec<NodeId> = graph.successors(NodeId::new(0)).collect();
/// assert_eq!(successors, vec![NodeId::new(1), NodeId::new(2)]);
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub trait Successors: GraphBase {
    /// Returns an iterator over the successor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `v` is a successor of `u`.
    ///
    /// # Panics
    ///
    /// May panic if `node` is outside of the node id space.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;

    /// Returns the number of outgoing edges of `node`.
    fn successor_count(&self, node: NodeId) -> usize {
        self.successors(node).count()
    }

    /// Returns the total number of edges between nodes of the graph.
    fn edge_count(&self) -> usize {
        self.node_ids().map(|node| self.successor_count(node)).sum()
    }
}

/// Trait for graphs that support backward edge traversal.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{DirectedGraph, NodeId, Predecessors};
///
/// let graph = DirectedGraph::from_edges(3, [(0, 2), (1, 2)]);
/// assert_eq!(graph.predecessor_count(NodeId::new(2)), 2);
/// assert_eq!(graph.predecessor_count(NodeId::new(0)), 0);
/// ```
pub trait Predecessors: GraphBase {
    /// Returns an iterator over the predecessor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `u` is a predecessor of `v`.
    ///
    /// # Panics
    ///
    /// May panic if `node` is outside of the node id space.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;

    /// Returns the number of incoming edges of `node`.
    fn predecessor_count(&self, node: NodeId) -> usize {
        self.predecessors(node).count()
    }
}

impl<G: GraphBase + ?Sized> GraphBase for &G {
    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (**self).node_ids()
    }
}

impl<G: Successors + ?Sized> Successors for &G {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        (**self).successors(node)
    }
}

impl<G: Predecessors + ?Sized> Predecessors for &G {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        (**self).predecessors(node)
    }
}
