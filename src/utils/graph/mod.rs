//! Directed graph infrastructure for control-flow analysis.
//!
//! This module provides the graph types and algorithms the irreducible-loop converter is
//! built on. Graphs carry no payload: nodes are dense [`NodeId`]s and everything a caller
//! knows about a node lives in its own vectors, indexed by the id.
//!
//! # Architecture
//!
//! The graph module is organized into several components:
//!
//! - **Core Types**: [`NodeId`], [`DirectedGraph`] and [`GraphBuilder`] provide the
//!   immutable graph representation, [`MutableDirectedGraph`] the editable working copy
//! - **Views**: [`FilteredGraph`] restricts a graph to a node subset without copying it
//! - **Trees**: [`LcaTree`] answers ancestor and common-ancestor queries in `O(log n)`
//! - **Algorithms**: traversal, dominators, dominance frontiers, back edges, SCCs
//! - **Traits**: [`GraphBase`], [`Successors`] and [`Predecessors`] let every algorithm
//!   run on any of the above, or on a caller's own graph type
//!
//! # Design Principles
//!
//! ## Strongly-Typed Identifiers
//!
//! Node identifiers use a newtype wrapper to prevent accidental mixing of node indices
//! with weights, depths or traversal positions.
//!
//! ## Immutable After Construction
//!
//! [`DirectedGraph`] is frozen once built. Algorithms that need to edit a graph work on a
//! [`MutableDirectedGraph`] and freeze the result.
//!
//! # Usage Examples
//!
//! ```rust
//! use cfgreduce::utils::graph::{algorithms, DirectedGraph, GraphBase, NodeId, Successors};
//!
//! // Diamond: 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
//! let graph = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)]);
//! assert_eq!(graph.node_count(), 4);
//! assert_eq!(graph.edge_count(), 4);
//!
//! let dominators = algorithms::build_dominator_tree(&graph);
//! assert!(dominators.dominates(NodeId::new(0), NodeId::new(3)));
//! ```
//!
//! # Thread Safety
//!
//! [`DirectedGraph`], [`MutableDirectedGraph`] and [`LcaTree`] are [`Send`] and [`Sync`].
//! [`FilteredGraph`] holds arbitrary closures and is meant for local use.

mod directed;
mod filtered;
mod lca;
mod mutable;
mod node;
mod traits;

pub mod algorithms;

pub use directed::{DirectedGraph, GraphBuilder};
pub use filtered::{subgraph, FilteredGraph};
pub use lca::LcaTree;
pub use mutable::MutableDirectedGraph;
pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, Successors};
