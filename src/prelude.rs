//! # cfgreduce Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cfgreduce library. Import this module to get quick access to graph types,
//! dominator analysis and the irreducible-graph converter.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cfgreduce operations
pub use crate::Error;

/// The result type used throughout cfgreduce
pub use crate::Result;

// ================================================================================================
// Graph Infrastructure
// ================================================================================================

/// Graph types and the traits algorithms are written against
pub use crate::utils::graph::{
    DirectedGraph, FilteredGraph, GraphBase, GraphBuilder, MutableDirectedGraph, NodeId,
    Predecessors, Successors,
};

/// Union-find over dense integer ids
pub use crate::utils::DisjointSet;

// ================================================================================================
// Algorithms
// ================================================================================================

/// Dominator analysis
pub use crate::utils::graph::algorithms::{
    build_dominator_graph, build_dominator_tree, compute_dominance_frontiers, compute_dominators,
    DominatorTree,
};

/// Loop and reducibility analysis
pub use crate::utils::graph::algorithms::{
    find_back_edges, is_irreducible, strongly_connected_components,
};

// ================================================================================================
// Irreducible Loop Elimination
// ================================================================================================

/// DJ-graph, backend contract, converter and batch mode
pub use crate::analysis::{
    convert_batch, split_irreducible_graph, ConversionJob, ConversionResult, ConverterConfig,
    DjGraph, EdgeKind, GraphCopyBackend, GraphSplittingBackend, IrreducibleGraphConverter,
};
