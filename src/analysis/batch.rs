//! Parallel conversion of independent graphs.
//!
//! A compiler converts one control-flow graph per method. The conversions share no
//! mutable state, so [`convert_batch`] runs them on the [`rayon`] thread pool. Each job
//! brings its own backend; a backend that talks to shared compiler state is responsible
//! for its own locking.

use rayon::prelude::*;

use crate::{
    analysis::{
        ConversionResult, ConverterConfig, GraphSplittingBackend, IrreducibleGraphConverter,
    },
    utils::graph::DirectedGraph,
    Result,
};

/// One graph to convert, with its weights and the backend performing its splits.
#[derive(Debug, Clone)]
pub struct ConversionJob<B> {
    /// The control-flow graph
    pub graph: DirectedGraph,
    /// One profile weight per node
    pub weights: Vec<u64>,
    /// The backend duplicating nodes of this graph
    pub backend: B,
}

impl<B> ConversionJob<B> {
    /// Creates a new job.
    #[must_use]
    pub fn new(graph: DirectedGraph, weights: Vec<u64>, backend: B) -> Self {
        ConversionJob {
            graph,
            weights,
            backend,
        }
    }
}

/// Converts every job in parallel.
///
/// Results are returned in job order. A failing job does not affect the others.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::analysis::{convert_batch, ConversionJob, ConverterConfig, GraphCopyBackend};
/// use cfgreduce::utils::graph::DirectedGraph;
///
/// let irreducible = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
/// let straight = DirectedGraph::from_edges(2, [(0, 1)]);
///
/// let mut jobs = vec![
///     ConversionJob::new(irreducible.clone(), vec![1; 3], GraphCopyBackend::new(&irreducible)),
///     // One weight short
///     ConversionJob::new(straight.clone(), vec![1], GraphCopyBackend::new(&straight)),
/// ];
/// let results = convert_batch(&mut jobs, &ConverterConfig::default());
///
/// assert_eq!(results[0].as_ref().map(|r| r.split_count()).ok(), Some(1));
/// assert!(results[1].is_err());
/// assert_eq!(jobs[0].backend.calls().len(), 1);
/// ```
pub fn convert_batch<B>(
    jobs: &mut [ConversionJob<B>],
    config: &ConverterConfig,
) -> Vec<Result<ConversionResult>>
where
    B: GraphSplittingBackend + Send,
{
    let converter = IrreducibleGraphConverter::with_config(config.clone());
    jobs.par_iter_mut()
        .map(|job| converter.convert(&job.graph, &job.weights, &mut job.backend))
        .collect()
}
