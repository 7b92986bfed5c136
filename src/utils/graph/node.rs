//! Dense node identifiers.
//!
//! Every graph in this crate addresses its nodes by a dense index in `[0, node_count)`.
//! All per-node information (weights, dominator links, merge classes, copies) lives in
//! parallel vectors indexed by [`NodeId::index`], so a node never owns any data itself.

use std::fmt;

/// A strongly-typed identifier for a node of a control-flow graph.
///
/// `NodeId` wraps a `usize` index, providing type safety to prevent accidental mixing of
/// node indices with weights, depths or positions in traversal orders. Ids are only
/// meaningful relative to the graph they were taken from: rebuilding a graph (for example
/// the subgraph built while splitting an irreducible region) renumbers its nodes.
///
/// Node `0` is the entry of a control-flow graph by convention, see [`NodeId::ENTRY`].
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::NodeId;
///
/// let weights = [10u64, 20, 30];
/// let node = NodeId::new(1);
/// assert_eq!(weights[node.index()], 20);
/// assert_eq!(NodeId::ENTRY.index(), 0);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The conventional entry node of a control-flow graph.
    pub const ENTRY: NodeId = NodeId(0);

    /// Creates a new `NodeId` from a raw index value.
    ///
    /// # Arguments
    ///
    /// * `index` - The raw node index (0-based)
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw index value of this node identifier.
    ///
    /// The index can be used directly to address per-node vectors.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    /// Formats the node as its bare index, matching DOT output and error messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(node: NodeId) -> Self {
        node.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_node_id_index() {
        let node = NodeId::new(42);
        assert_eq!(node.index(), 42);
        assert_eq!(NodeId::ENTRY, NodeId::new(0));
    }

    #[test]
    fn test_node_id_ordering() {
        let mut nodes = vec![NodeId::new(3), NodeId::new(1), NodeId::new(2)];
        nodes.sort();
        assert_eq!(nodes, vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)]);

        // Adjacency sets rely on the index ordering
        let set: BTreeSet<NodeId> = [5, 0, 3].into_iter().map(NodeId::new).collect();
        let ordered: Vec<usize> = set.into_iter().map(NodeId::index).collect();
        assert_eq!(ordered, vec![0, 3, 5]);
    }

    #[test]
    fn test_node_id_conversions() {
        let node: NodeId = 123usize.into();
        assert_eq!(node.index(), 123);

        let value: usize = NodeId::new(789).into();
        assert_eq!(value, 789);
    }

    #[test]
    fn test_node_id_formatting() {
        let node = NodeId::new(42);
        assert_eq!(format!("{node:?}"), "NodeId(42)");
        assert_eq!(format!("{node}"), "42");
    }
}
