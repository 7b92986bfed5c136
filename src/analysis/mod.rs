//! Irreducible loop elimination for control-flow graphs.
//!
//! This module builds on the generic graph infrastructure in [`crate::utils::graph`] to
//! turn irreducible control-flow graphs into reducible ones by node splitting.
//!
//! # Architecture
//!
//! - [`DjGraph`] - A CFG combined with its dominator tree, edge classification and
//!   node collapsing
//! - [`GraphSplittingBackend`] - The contract for duplicating nodes of the real program,
//!   with [`GraphCopyBackend`] as the plain-graph implementation
//! - [`IrreducibleGraphConverter`] - The level-by-level splitting algorithm, configured
//!   through [`ConverterConfig`] and producing a [`ConversionResult`]
//! - [`convert_batch`] - Parallel conversion of independent graphs
//!
//! # Usage
//!
//! ```rust
//! use cfgreduce::analysis::{split_irreducible_graph, GraphCopyBackend};
//! use cfgreduce::utils::graph::{algorithms::is_irreducible, DirectedGraph};
//!
//! let cfg = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
//! assert!(is_irreducible(&cfg));
//!
//! let mut backend = GraphCopyBackend::new(&cfg);
//! let result = split_irreducible_graph(&cfg, &[1, 1, 1], &mut backend)?;
//! assert!(!is_irreducible(result.graph()));
//! # Ok::<(), cfgreduce::Error>(())
//! ```

mod backend;
mod batch;
mod config;
mod converter;
mod djgraph;
mod result;

pub use backend::{GraphCopyBackend, GraphSplittingBackend, SplitCall};
pub use batch::{convert_batch, ConversionJob};
pub use config::ConverterConfig;
pub use converter::{split_irreducible_graph, IrreducibleGraphConverter};
pub use djgraph::{DjGraph, EdgeKind};
pub use result::ConversionResult;
