// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cfgreduce
//!
//! Control-flow graph analysis and irreducible-loop elimination in pure Rust.
//!
//! `cfgreduce` takes a control-flow graph described purely by dense node ids and adjacency
//! lists, computes its dominator tree, classifies its edges on a DJ-graph and converts
//! irreducible loops into reducible ones by node splitting, following
//! "Handling irreducible loops: optimized node splitting vs. DJ-graphs" by Unger and Mueller.
//!
//! ## Features
//!
//! - **Graph toolbox** - immutable and mutable directed graphs, filtered views, traversals
//! - **Dominators** - iterative dominator computation backed by a binary-lifting LCA tree,
//!   dominance frontiers and dominator graphs
//! - **Loop analysis** - back edges, irreducibility test, iterative Tarjan SCC
//! - **DJ-graphs** - dominator/join edge classification with node-class collapsing
//! - **Node splitting** - conversion of irreducible graphs through a pluggable
//!   [`GraphSplittingBackend`](analysis::GraphSplittingBackend)
//! - **Batch processing** - independent conversions on a rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use cfgreduce::prelude::*;
//!
//! // Two entries into the loop 1 <-> 2 make this graph irreducible
//! let cfg = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
//! assert!(is_irreducible(&cfg));
//!
//! let mut backend = GraphCopyBackend::new(&cfg);
//! let result = split_irreducible_graph(&cfg, &[1, 1, 1], &mut backend)?;
//!
//! assert!(!is_irreducible(result.graph()));
//! assert_eq!(result.split_count(), 1);
//! # Ok::<(), cfgreduce::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`utils`] - Graph data structures, union-find, dominators and graph algorithms
//! - [`analysis`] - DJ-graphs, the splitting backend contract and the converter
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: split and collapse decisions at `debug`,
//! per-level scans at `trace`. No logger is installed by the library itself.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cfgreduce::prelude::*;
///
/// let cfg = DirectedGraph::from_edges(2, [(0, 1)]);
/// let dom = build_dominator_tree(&cfg);
/// assert!(dom.dominates(NodeId::new(0), NodeId::new(1)));
/// ```
pub mod prelude;

/// Graph infrastructure and general purpose helpers.
///
/// - [`utils::graph`] - Graph types, traits, the LCA tree and graph algorithms
/// - [`utils::DisjointSet`] - Union-find used to partition loop bodies into domains
/// - [`utils::to_dot`] - Graphviz rendering for debugging
pub mod utils;

/// Irreducible-loop elimination.
///
/// - [`analysis::DjGraph`] - CFG combined with its dominator tree and edge classification
/// - [`analysis::GraphSplittingBackend`] - Contract for duplicating real program nodes
/// - [`analysis::IrreducibleGraphConverter`] - Turns irreducible graphs into reducible ones
/// - [`analysis::convert_batch`] - Runs many independent conversions in parallel
pub mod analysis;

/// `cfgreduce` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `cfgreduce` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::{analysis::DjGraph, utils::graph::DirectedGraph, Error};
///
/// let cfg = DirectedGraph::from_edges(2, [(0, 1)]);
/// match DjGraph::new(&cfg, &[1]) {
///     Err(Error::WeightMismatch { .. }) => println!("weights missing"),
///     Err(e) => println!("Error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
pub use error::Error;
