//! The node splitting contract between the converter and the program it transforms.
//!
//! The converter only sees an abstract control-flow graph. Duplicating the instructions
//! of a basic block, fixing up phi nodes and allocating block ids is the job of whoever
//! owns the real program. [`GraphSplittingBackend`] is that seam: the converter decides
//! *which* nodes to duplicate and the backend performs the duplication.
//!
//! [`GraphCopyBackend`] is a ready-made backend that performs the split on a plain graph.
//! It is what [`crate::analysis::split_irreducible_graph`] callers reach for when they
//! only need the reducible graph and the copy mapping.

use std::collections::HashMap;

use crate::{
    utils::graph::{DirectedGraph, GraphBase, MutableDirectedGraph, NodeId, Successors},
    Error, Result,
};

/// Performs node duplication on behalf of the converter.
///
/// For every irreducible region the converter keeps one domain intact and asks the
/// backend to duplicate the nodes of all other domains. Implementations must:
///
/// - return exactly one new node id per entry of `nodes`, in the same order
/// - only return ids that did not exist before the call, with no id returned twice
/// - rewire their program so that edges from `domain` into `nodes` target the copies,
///   while copies keep every outgoing edge of their original, pointing at the copy of the
///   target when the target was duplicated by the same call
///
/// A node may be duplicated several times over the course of one conversion, including
/// nodes that are themselves copies from an earlier call.
///
/// # Errors
///
/// Failures are reported as [`Error::Backend`] by convention and abort the conversion.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::analysis::GraphSplittingBackend;
/// use cfgreduce::utils::graph::NodeId;
/// use cfgreduce::Result;
///
/// /// Allocates block ids and records what it was asked to do.
/// struct BlockAllocator {
///     next_block: usize,
///     log: Vec<(Vec<NodeId>, Vec<NodeId>)>,
/// }
///
/// impl GraphSplittingBackend for BlockAllocator {
///     fn split(&mut self, domain: &[NodeId], nodes: &[NodeId]) -> Result<Vec<NodeId>> {
///         self.log.push((domain.to_vec(), nodes.to_vec()));
///         let copies = (0..nodes.len()).map(|i| NodeId::new(self.next_block + i)).collect();
///         self.next_block += nodes.len();
///         Ok(copies)
///     }
/// }
/// ```
pub trait GraphSplittingBackend {
    /// Duplicates `nodes` and points the edges from `domain` into them at the copies.
    ///
    /// # Arguments
    ///
    /// * `domain` - The nodes of the domain that is kept intact
    /// * `nodes` - The nodes to duplicate
    ///
    /// # Returns
    ///
    /// One fresh node id per entry of `nodes`, in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the duplication cannot be performed.
    fn split(&mut self, domain: &[NodeId], nodes: &[NodeId]) -> Result<Vec<NodeId>>;
}

impl<B: GraphSplittingBackend + ?Sized> GraphSplittingBackend for &mut B {
    fn split(&mut self, domain: &[NodeId], nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        (**self).split(domain, nodes)
    }
}

impl<B: GraphSplittingBackend + ?Sized> GraphSplittingBackend for Box<B> {
    fn split(&mut self, domain: &[NodeId], nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        (**self).split(domain, nodes)
    }
}

/// Applies one split to `graph`: copies take over the outgoing edges of their originals
/// and the edges from `domain` into duplicated nodes move onto the copies.
///
/// `copies` must be parallel to `nodes`. The graph grows to hold the copies.
pub(crate) fn redirect_split(
    graph: &mut MutableDirectedGraph,
    domain: &[NodeId],
    nodes: &[NodeId],
    copies: &[NodeId],
) {
    let copy_of: HashMap<NodeId, NodeId> =
        nodes.iter().copied().zip(copies.iter().copied()).collect();
    if let Some(max) = copies.iter().max() {
        graph.ensure_size(max.index() + 1);
    }

    for (&node, &copy) in nodes.iter().zip(copies) {
        let successors: Vec<NodeId> = graph.successors(node).collect();
        for succ in successors {
            let target = copy_of.get(&succ).copied().unwrap_or(succ);
            graph.add_edge(copy, target);
        }
    }

    for &kept in domain {
        let successors: Vec<NodeId> = graph.successors(kept).collect();
        for succ in successors {
            if let Some(&copy) = copy_of.get(&succ) {
                graph.delete_edge(kept, succ);
                graph.add_edge(kept, copy);
            }
        }
    }
}

/// One recorded invocation of [`GraphCopyBackend::split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCall {
    /// The nodes of the kept domain
    pub domain: Vec<NodeId>,
    /// The nodes that were duplicated
    pub nodes: Vec<NodeId>,
    /// The copies, parallel to `nodes`
    pub copies: Vec<NodeId>,
}

/// A [`GraphSplittingBackend`] that duplicates nodes of a plain graph.
///
/// Copies are numbered consecutively from the size of the graph. Every call is recorded,
/// which makes the backend useful in tests and as a reference for custom backends.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::analysis::{GraphCopyBackend, GraphSplittingBackend};
/// use cfgreduce::utils::graph::{DirectedGraph, GraphBase, NodeId};
///
/// let graph = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
/// let mut backend = GraphCopyBackend::new(&graph);
///
/// let copies = backend.split(&[NodeId::new(1)], &[NodeId::new(2)])?;
/// assert_eq!(copies, vec![NodeId::new(3)]);
/// assert_eq!(backend.graph().node_count(), 4);
/// assert_eq!(backend.calls().len(), 1);
/// # Ok::<(), cfgreduce::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct GraphCopyBackend {
    graph: MutableDirectedGraph,
    calls: Vec<SplitCall>,
}

impl GraphCopyBackend {
    /// Creates a backend operating on a copy of `graph`.
    #[must_use]
    pub fn new<G: Successors>(graph: &G) -> Self {
        GraphCopyBackend {
            graph: MutableDirectedGraph::from_graph(graph),
            calls: Vec::new(),
        }
    }

    /// Returns the graph in its current, partially split state.
    #[must_use]
    pub fn graph(&self) -> &MutableDirectedGraph {
        &self.graph
    }

    /// Consumes the backend and freezes its graph.
    #[must_use]
    pub fn into_graph(self) -> DirectedGraph {
        self.graph.to_graph()
    }

    /// Returns every split performed so far, in call order.
    #[must_use]
    pub fn calls(&self) -> &[SplitCall] {
        &self.calls
    }
}

impl GraphSplittingBackend for GraphCopyBackend {
    fn split(&mut self, domain: &[NodeId], nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        let size = self.graph.node_count();
        if let Some(&node) = domain.iter().chain(nodes).find(|node| node.index() >= size) {
            return Err(Error::NodeOutOfRange { node, size });
        }

        let copies: Vec<NodeId> = nodes.iter().map(|_| self.graph.add_node()).collect();
        redirect_split(&mut self.graph, domain, nodes, &copies);

        self.calls.push(SplitCall {
            domain: domain.to_vec(),
            nodes: nodes.to_vec(),
            copies: copies.clone(),
        });
        Ok(copies)
    }
}
