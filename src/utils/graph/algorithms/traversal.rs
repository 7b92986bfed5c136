//! Graph traversal algorithms.
//!
//! This module provides depth-first traversals for directed graphs. These are the
//! building blocks for the dominator computation, the spanning tree of the DJ-graph
//! and the loop analyses.
//!
//! # Algorithms
//!
//! - [`postorder`] - Depth-first search with post-order visitation
//! - [`reverse_postorder`] - Reverse post-order (useful for forward data flow)
//! - [`dfs_numbering`] - Reverse post-order position of every node
//!
//! Both orders are returned as collected vectors since they require a full traversal
//! anyway.

use crate::utils::graph::{NodeId, Successors};

/// Computes the postorder traversal of nodes reachable from the start.
///
/// In postorder, a node is visited after all of its descendants in the DFS tree.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{algorithms::postorder, DirectedGraph, NodeId};
///
/// let graph = DirectedGraph::from_edges(3, [(0, 1), (1, 2)]);
///
/// let order = postorder(&graph, NodeId::new(0));
/// assert_eq!(order, vec![NodeId::new(2), NodeId::new(1), NodeId::new(0)]);
/// ```
#[allow(clippy::items_after_statements)]
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let node_count = graph.node_count();

    if start.index() >= node_count {
        return Vec::new();
    }

    let mut visited = vec![false; node_count];
    let mut result = Vec::with_capacity(node_count);

    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    let mut stack = vec![(start, State::Enter)];

    while let Some((node, state)) = stack.pop() {
        match state {
            State::Enter => {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;

                // Exit is processed after all children
                stack.push((node, State::Exit));

                let successors: Vec<NodeId> = graph.successors(node).collect();
                for &succ in successors.iter().rev() {
                    if !visited[succ.index()] {
                        stack.push((succ, State::Enter));
                    }
                }
            }
            State::Exit => {
                result.push(node);
            }
        }
    }

    result
}

/// Computes the reverse postorder traversal of nodes reachable from the start.
///
/// Reverse postorder (RPO) places a node before any of its successors except along
/// back edges. This is the iteration order of the dominator computation.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{algorithms::reverse_postorder, DirectedGraph, NodeId};
///
/// let graph = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)]);
///
/// let order = reverse_postorder(&graph, NodeId::new(0));
/// assert_eq!(order.first(), Some(&NodeId::new(0)));
/// assert_eq!(order.last(), Some(&NodeId::new(3)));
/// ```
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut result = postorder(graph, start);
    result.reverse();
    result
}

/// Numbers every node by its position in the reverse postorder from node 0.
///
/// Nodes unreachable from node 0 receive no number.
#[must_use]
pub fn dfs_numbering<G: Successors>(graph: &G) -> Vec<Option<usize>> {
    let mut numbering = vec![None; graph.node_count()];
    for (position, node) in reverse_postorder(graph, NodeId::ENTRY).into_iter().enumerate() {
        numbering[node.index()] = Some(position);
    }
    numbering
}

#[cfg(test)]
mod tests {
    use crate::utils::graph::{
        algorithms::traversal::{dfs_numbering, postorder, reverse_postorder},
        DirectedGraph, NodeId,
    };

    fn n(index: usize) -> NodeId {
        NodeId::new(index)
    }

    fn create_linear_graph() -> DirectedGraph {
        DirectedGraph::from_edges(3, [(0, 1), (1, 2)])
    }

    fn create_diamond_graph() -> DirectedGraph {
        DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)])
    }

    fn create_cycle_graph() -> DirectedGraph {
        DirectedGraph::from_edges(3, [(0, 1), (1, 2), (2, 0)])
    }

    fn create_tree_graph() -> DirectedGraph {
        //       0
        //      / \
        //     1   2
        //    / \   \
        //   3   4   5
        DirectedGraph::from_edges(6, [(0, 1), (0, 2), (1, 3), (1, 4), (2, 5)])
    }

    #[test]
    fn test_postorder_linear() {
        let graph = create_linear_graph();
        assert_eq!(postorder(&graph, n(0)), vec![n(2), n(1), n(0)]);
        assert_eq!(reverse_postorder(&graph, n(1)), vec![n(1), n(2)]);
    }

    #[test]
    fn test_invalid_start() {
        let graph = create_linear_graph();
        assert!(postorder(&graph, n(10)).is_empty());
        assert!(reverse_postorder(&graph, n(10)).is_empty());
    }

    #[test]
    fn test_postorder_diamond() {
        let graph = create_diamond_graph();
        let order = postorder(&graph, n(0));
        assert_eq!(order, vec![n(3), n(1), n(2), n(0)]);
    }

    #[test]
    fn test_postorder_tree() {
        let graph = create_tree_graph();
        let order = postorder(&graph, n(0));
        assert_eq!(order, vec![n(3), n(4), n(1), n(5), n(2), n(0)]);
    }

    #[test]
    fn test_postorder_skips_disconnected() {
        let graph = DirectedGraph::from_edges(4, [(0, 1), (2, 3)]);
        assert_eq!(postorder(&graph, n(0)), vec![n(1), n(0)]);
        assert_eq!(dfs_numbering(&graph), vec![Some(0), Some(1), None, None]);
    }

    #[test]
    fn test_reverse_postorder_with_cycle() {
        let graph = create_cycle_graph();
        let order = reverse_postorder(&graph, n(0));
        assert_eq!(order, vec![n(0), n(1), n(2)]);
    }

    #[test]
    fn test_self_loop() {
        let graph = DirectedGraph::from_edges(2, [(0, 0), (0, 1)]);
        assert_eq!(postorder(&graph, n(0)), vec![n(1), n(0)]);
    }

    #[test]
    fn test_dfs_numbering() {
        let graph = DirectedGraph::from_edges(5, [(0, 1), (0, 2), (1, 3), (2, 3), (4, 3)]);
        let numbering = dfs_numbering(&graph);

        assert_eq!(numbering[0], Some(0));
        assert_eq!(numbering[3], Some(3));
        assert_eq!(numbering[4], None);
        // Every edge between reachable nodes goes forward in an acyclic graph
        assert!(numbering[1] < numbering[3]);
        assert!(numbering[2] < numbering[3]);
    }

}
