//! Graph algorithms for control-flow analysis.
//!
//! This module provides the graph algorithms the irreducible-loop converter is built
//! from. Every algorithm is generic over the graph traits, so it runs on
//! [`DirectedGraph`](crate::utils::graph::DirectedGraph),
//! [`MutableDirectedGraph`](crate::utils::graph::MutableDirectedGraph), filtered views or
//! any caller-provided graph type.
//!
//! # Available Algorithms
//!
//! ## Traversal
//!
//! - [`postorder`] - Postorder traversal
//! - [`reverse_postorder`] - Reverse postorder traversal (useful for data flow)
//! - [`dfs_numbering`] - Reverse postorder position of every node
//!
//! ## Dominator Analysis
//!
//! - [`compute_dominators`] / [`build_dominator_tree`] - Dominator tree (Cooper/Harvey/Kennedy)
//! - [`compute_dominance_frontiers`] - Dominance frontiers (Cytron et al.)
//! - [`build_dominator_graph`] - The dominator tree as a graph
//! - [`DominatorTree`] - Result of dominator computation
//!
//! ## Loops and Reducibility
//!
//! - [`find_back_edges`] - Back edges of a depth-first traversal
//! - [`remove_loops`] - Acyclic copy of a graph
//! - [`is_irreducible`] - Detect loops with more than one entry
//!
//! ## Strongly Connected Components
//!
//! - [`strongly_connected_components`] - Tarjan's SCC algorithm
//!
//! # Algorithm Selection
//!
//! | Algorithm | Time Complexity | Use Case |
//! |-----------|-----------------|----------|
//! | DFS | O(V + E) | General traversal |
//! | Dominators | O(V + E) per pass | Loop analysis, DJ-graphs |
//! | Dominance frontiers | O(V + E + F) | Merge point placement |
//! | Back edges | O(V + E) | Loop headers, reducibility |
//! | SCC | O(V + E) | Loop bodies |
//!
//! # Examples
//!
//! ```rust
//! use cfgreduce::utils::graph::{algorithms, DirectedGraph, NodeId};
//!
//! // A loop 1 -> 2 -> 1 with exit 2 -> 3
//! let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 1), (2, 3)]);
//!
//! let dom_tree = algorithms::build_dominator_tree(&graph);
//! assert!(dom_tree.dominates(NodeId::new(1), NodeId::new(3)));
//!
//! let back_edges = algorithms::find_back_edges(&graph);
//! assert_eq!(back_edges, vec![(NodeId::new(2), NodeId::new(1))]);
//! assert!(!algorithms::is_irreducible(&graph));
//! ```

mod dominators;
mod reducibility;
mod scc;
mod traversal;

pub use dominators::{
    build_dominator_graph, build_dominator_tree, compute_dominance_frontiers, compute_dominators,
    DominatorIterator, DominatorTree,
};
pub use reducibility::{find_back_edges, is_irreducible, remove_loops};
pub use scc::strongly_connected_components;
pub use traversal::{dfs_numbering, postorder, reverse_postorder};
