//! The outcome of a conversion.

use crate::utils::{
    graph::{DirectedGraph, GraphBase, NodeId},
    to_dot_labeled,
};

/// A reducible control-flow graph together with the bookkeeping of how it was produced.
///
/// Node ids below [`ConversionResult::original_count`] are the nodes of the input graph.
/// Every id above is a copy created by a split and maps back to the input node it
/// duplicates, even if it was copied from another copy.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::analysis::{split_irreducible_graph, GraphCopyBackend};
/// use cfgreduce::utils::graph::{DirectedGraph, NodeId};
///
/// let cfg = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
/// let mut backend = GraphCopyBackend::new(&cfg);
/// let result = split_irreducible_graph(&cfg, &[4, 3, 2], &mut backend)?;
///
/// // Node 1 is heavier, so node 2 is duplicated
/// let copy = NodeId::new(3);
/// assert!(result.is_copy(copy));
/// assert_eq!(result.original_of(copy), Some(NodeId::new(2)));
/// assert_eq!(result.copies_of(NodeId::new(2)), &[copy]);
/// assert_eq!(result.weights()[copy.index()], 2);
/// # Ok::<(), cfgreduce::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub(crate) graph: DirectedGraph,
    pub(crate) weights: Vec<u64>,
    pub(crate) originals: Vec<NodeId>,
    pub(crate) copies: Vec<Vec<NodeId>>,
    pub(crate) split_count: usize,
    pub(crate) original_count: usize,
}

impl ConversionResult {
    /// Returns the reducible graph.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// Consumes the result and returns the reducible graph.
    #[must_use]
    pub fn into_graph(self) -> DirectedGraph {
        self.graph
    }

    /// Returns the weight of every node; copies carry the weight of their original.
    #[must_use]
    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    /// Returns the number of nodes in the reducible graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of nodes of the input graph.
    #[must_use]
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// Returns the input node that `node` stems from, `node` itself for input nodes.
    ///
    /// Returns `None` if `node` is outside of the graph.
    #[must_use]
    pub fn original_of(&self, node: NodeId) -> Option<NodeId> {
        self.originals.get(node.index()).copied()
    }

    /// Returns all copies of an input node, in ascending order.
    #[must_use]
    pub fn copies_of(&self, node: NodeId) -> &[NodeId] {
        self.copies.get(node.index()).map_or(&[], Vec::as_slice)
    }

    /// Checks whether `node` was created by a split.
    #[must_use]
    pub fn is_copy(&self, node: NodeId) -> bool {
        self.original_of(node).is_some_and(|original| original != node)
    }

    /// Returns the number of copies created by all splits.
    #[must_use]
    pub fn copy_count(&self) -> usize {
        self.copies.iter().map(Vec::len).sum()
    }

    /// Returns the number of times the splitting backend was invoked.
    #[must_use]
    pub fn split_count(&self) -> usize {
        self.split_count
    }

    /// Renders the reducible graph in DOT format, labelling copies with their original.
    #[must_use]
    pub fn to_dot(&self) -> String {
        to_dot_labeled(&self.graph, |node| match self.original_of(node) {
            Some(original) if original != node => format!("{node} (copy of {original})"),
            _ => node.to_string(),
        })
    }
}
