//! Immutable directed graph and its builder.
//!
//! [`DirectedGraph`] is the frozen form every analysis result is expressed in: adjacency
//! lists are sorted and free of duplicates, so repeated queries are cheap slice walks and
//! two graphs with the same edges compare equal. Graphs are assembled with a
//! [`GraphBuilder`], which accepts edges in any order and grows the node id space on demand.

use crate::utils::graph::{
    node::NodeId,
    traits::{GraphBase, Predecessors, Successors},
};

/// An immutable directed graph over the dense node id space `[0, node_count)`.
///
/// Both directions of every edge are stored, so successor and predecessor queries are
/// O(1) slice accesses. The graph carries no node or edge payload: all semantics live in
/// vectors owned by the caller and indexed by [`NodeId::index`].
///
/// # Thread Safety
///
/// `DirectedGraph` is [`Send`] and [`Sync`]; it is never modified after construction.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{DirectedGraph, NodeId};
///
/// // Diamond: 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3 (the duplicate edge is dropped)
/// let graph = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3), (1, 3)]);
///
/// assert_eq!(graph.successor_slice(NodeId::new(0)), &[NodeId::new(1), NodeId::new(2)]);
/// assert_eq!(graph.predecessor_slice(NodeId::new(3)), &[NodeId::new(1), NodeId::new(2)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectedGraph {
    /// Sorted, duplicate-free successor list per node
    successors: Vec<Vec<NodeId>>,
    /// Sorted, duplicate-free predecessor list per node
    predecessors: Vec<Vec<NodeId>>,
}

impl DirectedGraph {
    /// Creates a graph with `node_count` nodes and no edges.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        DirectedGraph {
            successors: vec![Vec::new(); node_count],
            predecessors: vec![Vec::new(); node_count],
        }
    }

    /// Builds a graph from raw `(from, to)` index pairs.
    ///
    /// The node count is the larger of `node_count` and one past the highest index used
    /// by any edge.
    ///
    /// # Arguments
    ///
    /// * `node_count` - Minimal size of the node id space
    /// * `edges` - Edges as pairs of raw indices
    #[must_use]
    pub fn from_edges<I>(node_count: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut builder = GraphBuilder::new(node_count);
        for (from, to) in edges {
            builder.add_edge(NodeId::new(from), NodeId::new(to));
        }
        builder.build()
    }

    /// Returns the successors of `node` as a sorted slice.
    ///
    /// # Panics
    ///
    /// Panics if `node` is outside of the node id space.
    #[must_use]
    pub fn successor_slice(&self, node: NodeId) -> &[NodeId] {
        &self.successors[node.index()]
    }

    /// Returns the predecessors of `node` as a sorted slice.
    ///
    /// # Panics
    ///
    /// Panics if `node` is outside of the node id space.
    #[must_use]
    pub fn predecessor_slice(&self, node: NodeId) -> &[NodeId] {
        &self.predecessors[node.index()]
    }

    /// Checks whether the edge `from -> to` exists.
    #[must_use]
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.successors
            .get(from.index())
            .is_some_and(|succs| succs.binary_search(&to).is_ok())
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Returns all edges as `(from, to)` pairs in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.successors.iter().enumerate().flat_map(|(from, succs)| {
            succs.iter().map(move |&to| (NodeId::new(from), to))
        })
    }
}

impl GraphBase for DirectedGraph {
    fn node_count(&self) -> usize {
        self.successors.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.successors.len()).map(NodeId::new)
    }
}

impl Successors for DirectedGraph {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.successors[node.index()].iter().copied()
    }

    fn successor_count(&self, node: NodeId) -> usize {
        self.successors[node.index()].len()
    }
}

impl Predecessors for DirectedGraph {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.predecessors[node.index()].iter().copied()
    }

    fn predecessor_count(&self, node: NodeId) -> usize {
        self.predecessors[node.index()].len()
    }
}

/// Incremental builder for [`DirectedGraph`].
///
/// Edges may be added in any order and more than once; [`GraphBuilder::build`] sorts and
/// deduplicates them. Adding an edge that touches a node beyond the current size grows the
/// node id space to `max(from, to) + 1`.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{GraphBase, GraphBuilder, NodeId};
///
/// let mut builder = GraphBuilder::new(1);
/// builder.add_edge(NodeId::new(0), NodeId::new(4));
/// let graph = builder.build();
/// assert_eq!(graph.node_count(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    successors: Vec<Vec<NodeId>>,
}

impl GraphBuilder {
    /// Creates a builder for a graph of (at least) `node_count` nodes.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        GraphBuilder {
            successors: vec![Vec::new(); node_count],
        }
    }

    /// Returns the current size of the node id space.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// Grows the node id space to at least `node_count` nodes.
    pub fn ensure_size(&mut self, node_count: usize) {
        if self.successors.len() < node_count {
            self.successors.resize_with(node_count, Vec::new);
        }
    }

    /// Adds the edge `from -> to`, growing the graph as needed.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.ensure_size(from.index().max(to.index()) + 1);
        self.successors[from.index()].push(to);
    }

    /// Freezes the builder into an immutable graph with sorted, duplicate-free adjacency.
    #[must_use]
    pub fn build(self) -> DirectedGraph {
        let mut successors = self.successors;
        let mut predecessors = vec![Vec::new(); successors.len()];

        for (from, succs) in successors.iter_mut().enumerate() {
            succs.sort_unstable();
            succs.dedup();
            for &to in succs.iter() {
                // Sources are visited in ascending order, so predecessor lists come out sorted
                predecessors[to.index()].push(NodeId::new(from));
            }
        }

        DirectedGraph {
            successors,
            predecessors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(index: usize) -> NodeId {
        NodeId::new(index)
    }

    #[test]
    fn test_empty_graph() {
        let graph = DirectedGraph::new(0);
        assert!(graph.is_empty());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_builder_grows_on_demand() {
        let mut builder = GraphBuilder::new(0);
        builder.add_edge(n(2), n(0));
        assert_eq!(builder.node_count(), 3);

        let graph = builder.build();
        assert_eq!(graph.node_count(), 3);
        assert!(graph.has_edge(n(2), n(0)));
        assert!(!graph.has_edge(n(0), n(2)));
    }

    #[test]
    fn test_builder_sorts_and_dedups() {
        let graph = DirectedGraph::from_edges(3, [(0, 2), (0, 1), (0, 2), (2, 0), (1, 0)]);

        assert_eq!(graph.successor_slice(n(0)), &[n(1), n(2)]);
        assert_eq!(graph.predecessor_slice(n(0)), &[n(1), n(2)]);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_adjacency_consistency() {
        let graph = DirectedGraph::from_edges(5, [(0, 1), (1, 2), (2, 1), (2, 3), (3, 3), (4, 0)]);

        for (from, to) in graph.edges() {
            assert!(graph.predecessor_slice(to).contains(&from));
        }
        for node in graph.node_ids() {
            for pred in graph.predecessors(node) {
                assert!(graph.successor_slice(pred).contains(&node));
            }
        }
    }

    #[test]
    fn test_self_loop_kept() {
        let graph = DirectedGraph::from_edges(1, [(0, 0)]);
        assert!(graph.has_edge(n(0), n(0)));
        assert_eq!(graph.successor_count(n(0)), 1);
        assert_eq!(graph.predecessor_count(n(0)), 1);
    }

    #[test]
    fn test_from_edges_minimum_size() {
        let graph = DirectedGraph::from_edges(10, [(0, 1)]);
        assert_eq!(graph.node_count(), 10);
        assert_eq!(graph.successor_count(n(9)), 0);
    }
}
