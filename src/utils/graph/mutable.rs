//! Mutable working graph.
//!
//! The splitting algorithms rewire edges while they run: collapsing a region redirects
//! its external edges onto a representative, splitting a region points the entries of
//! one domain at fresh copies. [`MutableDirectedGraph`] supports exactly these edits and
//! freezes back into a [`DirectedGraph`] once the work is done.

use std::collections::BTreeSet;

use crate::utils::graph::{
    directed::{DirectedGraph, GraphBuilder},
    node::NodeId,
    traits::{GraphBase, Predecessors, Successors},
};

/// A directed graph supporting edge insertion, edge removal and node detachment.
///
/// Adjacency is kept in ordered sets, so iteration is by ascending node id, duplicate
/// edges are ignored and both directions stay consistent after every edit. Nodes are
/// never removed from the id space; [`MutableDirectedGraph::detach_node`] only strips
/// their edges.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{GraphBase, MutableDirectedGraph, NodeId, Successors};
///
/// let mut graph = MutableDirectedGraph::new(2);
/// assert!(graph.add_edge(NodeId::new(0), NodeId::new(1)));
/// assert!(!graph.add_edge(NodeId::new(0), NodeId::new(1)));
///
/// // Edges to unknown nodes grow the graph
/// graph.add_edge(NodeId::new(1), NodeId::new(3));
/// assert_eq!(graph.node_count(), 4);
///
/// graph.detach_node(NodeId::new(1));
/// assert_eq!(graph.edge_count(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutableDirectedGraph {
    successors: Vec<BTreeSet<NodeId>>,
    predecessors: Vec<BTreeSet<NodeId>>,
}

impl MutableDirectedGraph {
    /// Creates a graph with `node_count` nodes and no edges.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        MutableDirectedGraph {
            successors: vec![BTreeSet::new(); node_count],
            predecessors: vec![BTreeSet::new(); node_count],
        }
    }

    /// Copies any graph into a new mutable graph of the same size.
    #[must_use]
    pub fn from_graph<G: Successors>(graph: &G) -> Self {
        let mut result = MutableDirectedGraph::new(graph.node_count());
        for from in graph.node_ids() {
            for to in graph.successors(from) {
                result.add_edge(from, to);
            }
        }
        result
    }

    /// Grows the node id space to at least `node_count` nodes.
    pub fn ensure_size(&mut self, node_count: usize) {
        if self.successors.len() < node_count {
            self.successors.resize_with(node_count, BTreeSet::new);
            self.predecessors.resize_with(node_count, BTreeSet::new);
        }
    }

    /// Appends a fresh node without edges and returns its id.
    pub fn add_node(&mut self) -> NodeId {
        let node = NodeId::new(self.successors.len());
        self.ensure_size(node.index() + 1);
        node
    }

    /// Adds the edge `from -> to`, growing the graph as needed.
    ///
    /// Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        self.ensure_size(from.index().max(to.index()) + 1);
        if !self.successors[from.index()].insert(to) {
            return false;
        }
        self.predecessors[to.index()].insert(from);
        true
    }

    /// Removes the edge `from -> to`.
    ///
    /// Returns `false` if there was no such edge.
    pub fn delete_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let removed = self
            .successors
            .get_mut(from.index())
            .is_some_and(|succs| succs.remove(&to));
        if removed {
            self.predecessors[to.index()].remove(&from);
        }
        removed
    }

    /// Checks whether the edge `from -> to` exists.
    #[must_use]
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.successors
            .get(from.index())
            .is_some_and(|succs| succs.contains(&to))
    }

    /// Removes every edge incident to `node`, in both directions.
    ///
    /// # Panics
    ///
    /// Panics if `node` is outside of the node id space.
    pub fn detach_node(&mut self, node: NodeId) {
        let succs = std::mem::take(&mut self.successors[node.index()]);
        for succ in succs {
            self.predecessors[succ.index()].remove(&node);
        }

        let preds = std::mem::take(&mut self.predecessors[node.index()]);
        for pred in preds {
            self.successors[pred.index()].remove(&node);
        }
    }

    /// Freezes the current state into an immutable [`DirectedGraph`].
    #[must_use]
    pub fn to_graph(&self) -> DirectedGraph {
        let mut builder = GraphBuilder::new(self.successors.len());
        for (from, succs) in self.successors.iter().enumerate() {
            for &to in succs {
                builder.add_edge(NodeId::new(from), to);
            }
        }
        builder.build()
    }
}

impl GraphBase for MutableDirectedGraph {
    fn node_count(&self) -> usize {
        self.successors.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.successors.len()).map(NodeId::new)
    }
}

impl Successors for MutableDirectedGraph {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.successors[node.index()].iter().copied()
    }

    fn successor_count(&self, node: NodeId) -> usize {
        self.successors[node.index()].len()
    }
}

impl Predecessors for MutableDirectedGraph {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.predecessors[node.index()].iter().copied()
    }

    fn predecessor_count(&self, node: NodeId) -> usize {
        self.predecessors[node.index()].len()
    }
}
