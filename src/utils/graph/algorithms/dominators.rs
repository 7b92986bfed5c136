//! Dominator tree computation using the Cooper/Harvey/Kennedy algorithm.
//!
//! This module provides dominator tree computation for rooted directed graphs. The
//! dominator tree is the backbone of the irreducible-loop elimination in this crate:
//!
//! - DJ-graph edge classification (dominator edges vs. join edges)
//! - Loop detection and reducibility checks
//! - Dominance frontiers for placing merge points
//!
//! # Theory
//!
//! A node `d` **dominates** a node `n` if every path from the entry node to `n`
//! must pass through `d`. The **immediate dominator** of `n` (idom(n)) is the
//! unique node that strictly dominates `n` but does not strictly dominate any
//! other dominator of `n`.
//!
//! The dominator tree is formed by making each node's immediate dominator its
//! parent. The entry node is the root (it has no dominator). Nodes that cannot be
//! reached from the entry are not part of the tree.
//!
//! # Algorithm
//!
//! Immediate dominators are computed with the iterative data-flow formulation of
//! Cooper, Harvey and Kennedy ("A Simple, Fast Dominance Algorithm"): nodes are visited
//! in reverse postorder and each node's dominator is the intersection of the dominators
//! of its already processed predecessors, repeated until a fixed point is reached. On
//! reducible graphs this converges in two passes.
//!
//! The resulting tree is stored in an [`LcaTree`], so dominance checks and common
//! dominator queries cost `O(log depth)` instead of walking parent chains.

use crate::utils::graph::{
    algorithms::traversal::reverse_postorder, DirectedGraph, GraphBuilder, LcaTree, NodeId,
    Predecessors, Successors,
};

/// Marker for "no dominator computed yet" during the fixed-point iteration.
const UNDEFINED: usize = usize::MAX;

/// Result of dominator tree computation.
///
/// The dominator tree represents the dominance relationships in a control flow
/// graph. Each reachable node (except the entry) has exactly one immediate dominator.
/// Unreachable nodes have none and only dominate themselves.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{algorithms::compute_dominators, DirectedGraph, NodeId};
///
/// // Simple CFG: entry -> a -> b -> exit
/// let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 3)]);
/// let dom_tree = compute_dominators(&graph, NodeId::new(0));
///
/// // entry dominates everything
/// assert!(dom_tree.dominates(NodeId::new(0), NodeId::new(3)));
/// // a is the immediate dominator of b
/// assert_eq!(dom_tree.immediate_dominator(NodeId::new(2)), Some(NodeId::new(1)));
/// ```
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// The entry (root) node of the dominator tree
    entry: NodeId,
    /// Immediate dominator for each node, `None` for the entry and unreachable nodes
    idom: Vec<Option<NodeId>>,
    /// The dominator tree with binary lifting, nodes inserted in reverse postorder
    tree: LcaTree,
    /// Position of each graph node inside `tree`
    tree_index: Vec<Option<usize>>,
    /// Graph node stored at each position of `tree`
    tree_node: Vec<NodeId>,
}

impl DominatorTree {
    /// Returns the entry (root) node of the dominator tree.
    #[inline]
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the size of the node id space the tree was computed for.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.idom.len()
    }

    /// Returns the immediate dominator of a node.
    ///
    /// Returns `None` for the entry node and for nodes unreachable from it.
    ///
    /// # Panics
    ///
    /// Panics if the node index is out of bounds.
    #[inline]
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        self.idom[node.index()]
    }

    /// Checks whether `node` is reachable from the entry, i.e. part of the tree.
    #[inline]
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.tree_index
            .get(node.index())
            .is_some_and(Option::is_some)
    }

    /// Checks if node `a` dominates node `b`.
    ///
    /// A node dominates itself. An unreachable node dominates nothing but itself and is
    /// dominated by nothing but itself.
    ///
    /// # Complexity
    ///
    /// O(log depth) through the lowest-common-ancestor table.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        match (self.tree_position(a), self.tree_position(b)) {
            (Some(ta), Some(tb)) => self.tree.lca(ta, tb) == ta,
            _ => false,
        }
    }

    /// Checks if node `a` strictly dominates node `b`.
    ///
    /// Strict dominance excludes self-dominance: a strictly dominates b iff
    /// a dominates b and a ≠ b.
    #[inline]
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Returns the nearest node dominating both `a` and `b`.
    ///
    /// Returns `None` if either node is unreachable.
    #[must_use]
    pub fn common_dominator(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let ta = self.tree_position(a)?;
        let tb = self.tree_position(b)?;
        Some(self.tree_node[self.tree.lca(ta, tb)])
    }

    /// Returns the depth of a node in the dominator tree.
    ///
    /// The entry node has depth 0; unreachable nodes have no depth.
    #[must_use]
    pub fn depth(&self, node: NodeId) -> Option<usize> {
        self.tree_position(node).map(|index| self.tree.depth(index))
    }

    /// Returns an iterator over all dominators of a node, from the node itself
    /// up to (and including) the entry node.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfgreduce::utils::graph::{algorithms::compute_dominators, DirectedGraph, NodeId};
    ///
    /// let graph = DirectedGraph::from_edges(3, [(0, 1), (1, 2)]);
    /// let dom_tree = compute_dominators(&graph, NodeId::new(0));
    ///
    /// let dominators: Vec<NodeId> = dom_tree.dominators(NodeId::new(2)).collect();
    /// // 2 is dominated by 2, 1, and 0
    /// assert_eq!(dominators, vec![NodeId::new(2), NodeId::new(1), NodeId::new(0)]);
    /// ```
    pub fn dominators(&self, node: NodeId) -> DominatorIterator<'_> {
        DominatorIterator {
            tree: self,
            current: Some(node),
        }
    }

    /// Returns all children of a node in the dominator tree, in ascending order.
    ///
    /// # Complexity
    ///
    /// O(V) where V is the number of nodes.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.idom
            .iter()
            .enumerate()
            .filter(|(_, idom)| **idom == Some(node))
            .map(|(index, _)| NodeId::new(index))
            .collect()
    }

    /// Returns the reachable nodes in the order they were inserted into the tree.
    ///
    /// This is a reverse postorder of the graph, so every node comes after its
    /// immediate dominator.
    #[must_use]
    pub fn tree_order(&self) -> &[NodeId] {
        &self.tree_node
    }

    fn tree_position(&self, node: NodeId) -> Option<usize> {
        self.tree_index.get(node.index()).copied().flatten()
    }
}

/// Iterator over dominators of a node, from the node up to the entry.
#[derive(Debug)]
pub struct DominatorIterator<'a> {
    tree: &'a DominatorTree,
    current: Option<NodeId>,
}

impl Iterator for DominatorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.immediate_dominator(current);
        Some(current)
    }
}

/// Computes the dominator tree of the graph rooted at `entry`.
///
/// # Arguments
///
/// * `graph` - The graph to analyze
/// * `entry` - The root of the dominator tree
///
/// # Returns
///
/// A `DominatorTree` covering every node of `graph`. Nodes not reachable from `entry`
/// are reported as unreachable. An `entry` outside the graph yields a tree without any
/// reachable node.
///
/// # Complexity
///
/// - Time: O(V + E) per pass, with a small number of passes in practice
/// - Space: O(V log V) for the lifting table
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{algorithms::compute_dominators, DirectedGraph, NodeId};
///
/// // Diamond CFG:
/// //      0
/// //     / \
/// //    1   2
/// //     \ /
/// //      3
/// let graph = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)]);
/// let dom_tree = compute_dominators(&graph, NodeId::new(0));
///
/// // 1 and 2 don't dominate 3 (there are alternative paths)
/// assert!(!dom_tree.strictly_dominates(NodeId::new(1), NodeId::new(3)));
/// assert_eq!(dom_tree.immediate_dominator(NodeId::new(3)), Some(NodeId::new(0)));
/// ```
pub fn compute_dominators<G>(graph: &G, entry: NodeId) -> DominatorTree
where
    G: Successors + Predecessors,
{
    let node_count = graph.node_count();
    let rpo = reverse_postorder(graph, entry);

    let mut rpo_index = vec![None; node_count];
    for (index, node) in rpo.iter().enumerate() {
        rpo_index[node.index()] = Some(index);
    }

    let mut idom = vec![UNDEFINED; node_count];
    if let Some(first) = rpo.first() {
        // The start node is its own parent while iterating
        idom[first.index()] = first.index();
    }

    let mut changed = true;
    while changed {
        changed = false;
        for &node in rpo.iter().skip(1) {
            let mut new_idom = UNDEFINED;
            for pred in graph.predecessors(node) {
                let pred = pred.index();
                if rpo_index[pred].is_none() || idom[pred] == UNDEFINED {
                    continue;
                }
                new_idom = if new_idom == UNDEFINED {
                    pred
                } else {
                    intersect(&idom, &rpo_index, pred, new_idom)
                };
            }

            if new_idom != UNDEFINED && idom[node.index()] != new_idom {
                idom[node.index()] = new_idom;
                changed = true;
            }
        }
    }

    let mut tree = LcaTree::new(rpo.len());
    let mut tree_index = vec![None; node_count];
    let mut result_idom = vec![None; node_count];

    if let Some(&first) = rpo.first() {
        tree_index[first.index()] = Some(0);
    }
    for &node in rpo.iter().skip(1) {
        let parent = idom[node.index()];
        // A dominator always precedes the node in reverse postorder
        let Some(parent_index) = tree_index.get(parent).copied().flatten() else {
            continue;
        };
        tree_index[node.index()] = Some(tree.add_node(parent_index));
        result_idom[node.index()] = Some(NodeId::new(parent));
    }

    DominatorTree {
        entry,
        idom: result_idom,
        tree,
        tree_index,
        tree_node: rpo,
    }
}

/// Computes the dominator tree of a control-flow graph entered at node 0.
pub fn build_dominator_tree<G>(graph: &G) -> DominatorTree
where
    G: Successors + Predecessors,
{
    compute_dominators(graph, NodeId::ENTRY)
}

/// Walks two fingers up the partial dominator tree until they meet.
fn intersect(idom: &[usize], rpo_index: &[Option<usize>], mut a: usize, mut b: usize) -> usize {
    while a != b {
        while rpo_index[a] > rpo_index[b] {
            a = idom[a];
        }
        while rpo_index[b] > rpo_index[a] {
            b = idom[b];
        }
    }
    a
}

/// Computes the dominance frontier of every node.
///
/// The dominance frontier of a node `n` is the set of all nodes `m` such that:
/// - `n` dominates a predecessor of `m`, but
/// - `n` does not strictly dominate `m`
///
/// Frontiers are built bottom-up over the dominator tree (Cytron et al.): a node is
/// processed once all of its children are, combining its local frontier (successors it
/// does not immediately dominate) with the frontiers passed up by its children.
///
/// # Arguments
///
/// * `graph` - The control flow graph
/// * `dom_tree` - The precomputed dominator tree
///
/// # Returns
///
/// A vector where `result[i]` holds the sorted dominance frontier of node `i`.
/// Unreachable nodes have an empty frontier and never appear in one.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{
///     algorithms::{compute_dominance_frontiers, compute_dominators},
///     DirectedGraph, NodeId,
/// };
///
/// // Diamond CFG with join point 3
/// let graph = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)]);
/// let dom_tree = compute_dominators(&graph, NodeId::new(0));
/// let frontiers = compute_dominance_frontiers(&graph, &dom_tree);
///
/// assert_eq!(frontiers[1], vec![NodeId::new(3)]);
/// assert_eq!(frontiers[2], vec![NodeId::new(3)]);
/// assert!(frontiers[0].is_empty());
/// ```
pub fn compute_dominance_frontiers<G>(graph: &G, dom_tree: &DominatorTree) -> Vec<Vec<NodeId>>
where
    G: Successors,
{
    let node_count = graph.node_count().max(dom_tree.node_count());
    let mut frontiers: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];

    let mut pending = vec![0usize; node_count];
    for &node in dom_tree.tree_order() {
        if let Some(idom) = dom_tree.immediate_dominator(node) {
            pending[idom.index()] += 1;
        }
    }

    let mut worklist: Vec<NodeId> = dom_tree
        .tree_order()
        .iter()
        .copied()
        .filter(|node| pending[node.index()] == 0)
        .collect();

    let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
    while let Some(node) = worklist.pop() {
        let mut frontier = Vec::new();

        for succ in graph.successors(node) {
            if dom_tree.immediate_dominator(succ) != Some(node) && dom_tree.is_reachable(succ) {
                frontier.push(succ);
            }
        }

        for child in std::mem::take(&mut children[node.index()]) {
            for &candidate in &frontiers[child.index()] {
                if dom_tree.immediate_dominator(candidate) != Some(node) {
                    frontier.push(candidate);
                }
            }
        }

        frontier.sort_unstable();
        frontier.dedup();
        frontiers[node.index()] = frontier;

        if let Some(idom) = dom_tree.immediate_dominator(node) {
            children[idom.index()].push(node);
            pending[idom.index()] -= 1;
            if pending[idom.index()] == 0 {
                worklist.push(idom);
            }
        }
    }

    frontiers
}

/// Builds the graph of dominator tree edges `idom(n) -> n`.
///
/// The result has at least `node_count` nodes, more if the tree covers a larger id space.
#[must_use]
pub fn build_dominator_graph(dom_tree: &DominatorTree, node_count: usize) -> DirectedGraph {
    let mut builder = GraphBuilder::new(node_count.max(dom_tree.node_count()));
    for &node in dom_tree.tree_order() {
        if let Some(idom) = dom_tree.immediate_dominator(node) {
            builder.add_edge(idom, node);
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use crate::utils::graph::{
        algorithms::dominators::{
            build_dominator_graph, build_dominator_tree, compute_dominance_frontiers,
            compute_dominators,
        },
        DirectedGraph, GraphBase, NodeId, Successors,
    };

    fn n(index: usize) -> NodeId {
        NodeId::new(index)
    }

    #[test]
    fn test_dominator_empty_graph() {
        let graph = DirectedGraph::new(0);
        let dom_tree = compute_dominators(&graph, n(0));
        assert_eq!(dom_tree.node_count(), 0);
        assert!(!dom_tree.is_reachable(n(0)));
    }

    #[test]
    fn test_dominator_single_node() {
        let graph = DirectedGraph::new(1);
        let dom_tree = build_dominator_tree(&graph);

        assert_eq!(dom_tree.entry(), n(0));
        assert_eq!(dom_tree.immediate_dominator(n(0)), None);
        assert!(dom_tree.dominates(n(0), n(0)));
        assert_eq!(dom_tree.depth(n(0)), Some(0));
    }

    #[test]
    fn test_dominator_linear_chain() {
        // 0 -> 1 -> 2 -> 3
        let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 3)]);
        let dom_tree = build_dominator_tree(&graph);

        assert_eq!(dom_tree.immediate_dominator(n(0)), None);
        assert_eq!(dom_tree.immediate_dominator(n(1)), Some(n(0)));
        assert_eq!(dom_tree.immediate_dominator(n(2)), Some(n(1)));
        assert_eq!(dom_tree.immediate_dominator(n(3)), Some(n(2)));

        assert!(dom_tree.dominates(n(0), n(3)));
        assert!(dom_tree.dominates(n(1), n(3)));
        assert!(!dom_tree.dominates(n(3), n(2)));
        assert!(!dom_tree.dominates(n(2), n(1)));

        for i in 0..4 {
            assert_eq!(dom_tree.depth(n(i)), Some(i));
        }
    }

    #[test]
    fn test_dominator_diamond() {
        let graph = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)]);
        let dom_tree = build_dominator_tree(&graph);

        assert_eq!(dom_tree.immediate_dominator(n(1)), Some(n(0)));
        assert_eq!(dom_tree.immediate_dominator(n(2)), Some(n(0)));
        assert_eq!(dom_tree.immediate_dominator(n(3)), Some(n(0)));
        assert!(!dom_tree.strictly_dominates(n(1), n(3)));
        assert!(!dom_tree.strictly_dominates(n(2), n(3)));
        assert_eq!(dom_tree.common_dominator(n(1), n(2)), Some(n(0)));
        assert_eq!(dom_tree.common_dominator(n(3), n(3)), Some(n(3)));
    }

    #[test]
    fn test_dominator_loop() {
        // 0 -> 1 -> 2 -> 1, 2 -> 3
        let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 1), (2, 3)]);
        let dom_tree = build_dominator_tree(&graph);

        assert_eq!(dom_tree.immediate_dominator(n(1)), Some(n(0)));
        assert_eq!(dom_tree.immediate_dominator(n(2)), Some(n(1)));
        assert_eq!(dom_tree.immediate_dominator(n(3)), Some(n(2)));
        assert!(dom_tree.dominates(n(1), n(2)));
    }

    #[test]
    fn test_dominator_irreducible() {
        // Both loop nodes are entered directly from 0
        let graph = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
        let dom_tree = build_dominator_tree(&graph);

        assert_eq!(dom_tree.immediate_dominator(n(1)), Some(n(0)));
        assert_eq!(dom_tree.immediate_dominator(n(2)), Some(n(0)));
        assert!(!dom_tree.dominates(n(1), n(2)));
        assert!(!dom_tree.dominates(n(2), n(1)));
    }

    #[test]
    fn test_dominator_unreachable() {
        // 3 -> 1 is not reachable from 0
        let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (3, 1)]);
        let dom_tree = build_dominator_tree(&graph);

        assert!(!dom_tree.is_reachable(n(3)));
        assert_eq!(dom_tree.immediate_dominator(n(3)), None);
        assert_eq!(dom_tree.depth(n(3)), None);
        assert!(dom_tree.dominates(n(3), n(3)));
        assert!(!dom_tree.dominates(n(0), n(3)));
        assert!(!dom_tree.dominates(n(3), n(1)));
        assert_eq!(dom_tree.common_dominator(n(3), n(1)), None);
        assert_eq!(dom_tree.immediate_dominator(n(1)), Some(n(0)));
    }

    #[test]
    fn test_dominator_iterator() {
        let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (1, 3)]);
        let dom_tree = build_dominator_tree(&graph);

        let doms: Vec<NodeId> = dom_tree.dominators(n(3)).collect();
        assert_eq!(doms, vec![n(3), n(1), n(0)]);
    }

    #[test]
    fn test_dominator_children() {
        let graph = DirectedGraph::from_edges(5, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]);
        let dom_tree = build_dominator_tree(&graph);

        assert_eq!(dom_tree.children(n(0)), vec![n(1), n(2), n(3)]);
        assert_eq!(dom_tree.children(n(3)), vec![n(4)]);
        assert!(dom_tree.children(n(4)).is_empty());
    }

    #[test]
    fn test_dominator_graph() {
        let graph = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)]);
        let dom_tree = build_dominator_tree(&graph);
        let dom_graph = build_dominator_graph(&dom_tree, 6);

        assert_eq!(dom_graph.node_count(), 6);
        assert_eq!(dom_graph.edge_count(), 3);
        let succs: Vec<NodeId> = dom_graph.successors(n(0)).collect();
        assert_eq!(succs, vec![n(1), n(2), n(3)]);
    }

    #[test]
    fn test_dominance_frontier_loop() {
        // 0 -> 1 -> 2 -> 1, 2 -> 3
        let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 1), (2, 3)]);
        let dom_tree = build_dominator_tree(&graph);
        let frontiers = compute_dominance_frontiers(&graph, &dom_tree);

        assert_eq!(frontiers[2], vec![n(1)]);
        assert_eq!(frontiers[1], vec![n(1)]);
        assert!(frontiers[0].is_empty());
        assert!(frontiers[3].is_empty());
    }

    #[test]
    fn test_dominance_frontier_nested_if() {
        // 0 -> 1, 0 -> 5, 1 -> 2, 1 -> 3, 2 -> 4, 3 -> 4, 4 -> 6, 5 -> 6
        let graph = DirectedGraph::from_edges(
            7,
            [(0, 1), (0, 5), (1, 2), (1, 3), (2, 4), (3, 4), (4, 6), (5, 6)],
        );
        let dom_tree = build_dominator_tree(&graph);
        let frontiers = compute_dominance_frontiers(&graph, &dom_tree);

        assert_eq!(frontiers[2], vec![n(4)]);
        assert_eq!(frontiers[3], vec![n(4)]);
        assert_eq!(frontiers[4], vec![n(6)]);
        assert_eq!(frontiers[1], vec![n(6)]);
        assert_eq!(frontiers[5], vec![n(6)]);
        assert!(frontiers[6].is_empty());
    }

    #[test]
    fn test_dominance_frontier_skips_unreachable() {
        let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (3, 2)]);
        let dom_tree = build_dominator_tree(&graph);
        let frontiers = compute_dominance_frontiers(&graph, &dom_tree);

        assert!(frontiers[3].is_empty());
        assert!(frontiers.iter().all(|frontier| !frontier.contains(&n(3))));
    }
}
