use thiserror::Error;

use crate::utils::graph::NodeId;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant is fatal for the operation that produced it: conversions are pure in-memory
/// computations and nothing in this crate is retried. A caller compiling many methods should
/// treat an error as "this one graph could not be processed" and carry on with the others.
///
/// # Error Categories
///
/// ## Invalid Input
/// - [`Error::WeightMismatch`] - Weight array length differs from the node count
/// - [`Error::NodeOutOfRange`] - A node id outside of the graph was supplied
/// - [`Error::NoCommonDominator`] - A strongly connected component has no shared dominator
///
/// ## Structural Invariant Violations
/// - [`Error::InvalidCollapse`] - A collapse request without a dominating representative
/// - [`Error::InvalidBackendResult`] - A splitting backend broke its contract
/// - [`Error::Malformed`] - An internal consistency check failed
///
/// ## Resource Limits
/// - [`Error::RecursionLimit`] - Nested splitting went deeper than configured
///
/// ## Backend Errors
/// - [`Error::Backend`] - Failure reported by a [`GraphSplittingBackend`](crate::analysis::GraphSplittingBackend)
///
/// # Examples
///
/// ```rust
/// use cfgreduce::{analysis::split_irreducible_graph, Error};
/// use cfgreduce::analysis::GraphCopyBackend;
/// use cfgreduce::utils::graph::DirectedGraph;
///
/// let graph = DirectedGraph::from_edges(3, [(0, 1), (1, 2)]);
/// let mut backend = GraphCopyBackend::new(&graph);
///
/// match split_irreducible_graph(&graph, &[1, 1], &mut backend) {
///     Err(Error::WeightMismatch { expected, actual }) => {
///         assert_eq!((expected, actual), (3, 2));
///     }
///     other => panic!("unexpected result: {:?}", other.map(|r| r.node_count())),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The weight array does not match the graph it describes.
    ///
    /// Every node needs exactly one profile weight; the converter and the
    /// [`DjGraph`](crate::analysis::DjGraph) refuse to guess missing values.
    #[error("Node count {expected} is not equal to weight array length {actual}")]
    WeightMismatch {
        /// Number of nodes in the graph
        expected: usize,
        /// Number of weights supplied
        actual: usize,
    },

    /// A node id outside of `[0, node_count)` was passed to an operation.
    #[error("Node {node} is out of range for a graph of {size} nodes")]
    NodeOutOfRange {
        /// The offending node
        node: NodeId,
        /// Number of nodes in the graph
        size: usize,
    },

    /// A set of nodes could not be collapsed into a single representative.
    ///
    /// Collapsing requires the common dominator of all nodes to be one of them.
    /// Reaching this error means the caller handed over a node set that is not a
    /// single-entry region, which is a programming error rather than bad input.
    #[error("Invalid collapse - {0}")]
    InvalidCollapse(String),

    /// A strongly connected component has no common dominator.
    ///
    /// This happens for graphs with several entry points or with components that are
    /// not reachable from the entry node, neither of which is a well-formed CFG.
    #[error("Strongly connected component {0:?} has no common dominator")]
    NoCommonDominator(Vec<NodeId>),

    /// The splitting backend returned a result that violates its contract.
    ///
    /// Backends must return exactly one fresh node id per duplicated node, none of
    /// which may already exist in the graph being converted.
    #[error("Invalid backend result - {0}")]
    InvalidBackendResult(String),

    /// Recursion limit reached.
    ///
    /// Splitting an irreducible region recurses into a freshly built subgraph. The
    /// depth of this recursion is bounded by
    /// [`ConverterConfig::max_depth`](crate::analysis::ConverterConfig::max_depth).
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// An internal consistency check failed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was inconsistent
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failure reported by a splitting backend.
    #[error("{0}")]
    Backend(String),
}
