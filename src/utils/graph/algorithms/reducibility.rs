//! Back edges and the reducibility test.
//!
//! A control-flow graph is **reducible** when every loop has a single entry: for every
//! back edge `p -> s` of a depth-first traversal, the loop header `s` dominates the
//! latch `p`. Irreducible graphs contain a loop that can be entered at more than one
//! node and are what [`IrreducibleGraphConverter`](crate::analysis::IrreducibleGraphConverter)
//! removes.

use crate::utils::graph::{
    algorithms::dominators::build_dominator_tree, DirectedGraph, GraphBuilder, NodeId,
    Predecessors, Successors,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting,
    Visited,
}

/// Runs the three-state depth-first traversal shared by the loop analyses.
///
/// Traversal starts from every node without predecessors and from node 0, node 0 being
/// explored first. `on_edge` receives each examined edge together with the state its
/// target was in at that moment.
fn three_state_dfs<G, F>(graph: &G, mut on_edge: F)
where
    G: Successors + Predecessors,
    F: FnMut(NodeId, NodeId, VisitState),
{
    let node_count = graph.node_count();
    let mut state = vec![VisitState::None; node_count];
    let mut stack: Vec<NodeId> = graph
        .node_ids()
        .filter(|&node| node != NodeId::ENTRY && graph.predecessor_count(node) == 0)
        .collect();
    stack.reverse();
    if node_count > 0 {
        stack.push(NodeId::ENTRY);
    }

    while let Some(node) = stack.pop() {
        match state[node.index()] {
            VisitState::None => {
                state[node.index()] = VisitState::Visiting;
                stack.push(node);
                for next in graph.successors(node) {
                    let next_state = state[next.index()];
                    on_edge(node, next, next_state);
                    if next_state == VisitState::None {
                        stack.push(next);
                    }
                }
            }
            VisitState::Visiting => {
                state[node.index()] = VisitState::Visited;
            }
            VisitState::Visited => {}
        }
    }
}

/// Finds the back edges of a depth-first traversal of the graph.
///
/// An edge is a back edge when its target is still being explored while the edge is
/// examined, i.e. the target is an ancestor of the source in the traversal. Roots are
/// all nodes without predecessors plus node 0.
///
/// # Returns
///
/// The back edges as `(source, target)` pairs, in the order they were discovered.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{algorithms::find_back_edges, DirectedGraph, NodeId};
///
/// let graph = DirectedGraph::from_edges(3, [(0, 1), (1, 2), (2, 1)]);
/// assert_eq!(find_back_edges(&graph), vec![(NodeId::new(2), NodeId::new(1))]);
/// ```
pub fn find_back_edges<G>(graph: &G) -> Vec<(NodeId, NodeId)>
where
    G: Successors + Predecessors,
{
    let mut back_edges = Vec::new();
    three_state_dfs(graph, |from, to, state| {
        if state == VisitState::Visiting {
            back_edges.push((from, to));
        }
    });
    back_edges
}

/// Returns a copy of the graph without the back edges found by [`find_back_edges`].
///
/// The result is acyclic. Edges are kept when they lead to an unexplored node (tree
/// edges) or to a fully explored one (forward and cross edges).
pub fn remove_loops<G>(graph: &G) -> DirectedGraph
where
    G: Successors + Predecessors,
{
    let mut builder = GraphBuilder::new(graph.node_count());
    three_state_dfs(graph, |from, to, state| {
        if state != VisitState::Visiting {
            builder.add_edge(from, to);
        }
    });
    builder.build()
}

/// Checks whether a control-flow graph entered at node 0 is irreducible.
///
/// The graph is irreducible iff some back edge `p -> s`, with `p` reachable from node 0,
/// has a target `s` that does not dominate `p`. Back edges among unreachable nodes are
/// ignored; they belong to no executable loop.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{algorithms::is_irreducible, DirectedGraph};
///
/// // Single-entry loop
/// let reducible = DirectedGraph::from_edges(3, [(0, 1), (1, 2), (2, 1)]);
/// assert!(!is_irreducible(&reducible));
///
/// // The loop 1 <-> 2 is entered at both nodes
/// let irreducible = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
/// assert!(is_irreducible(&irreducible));
/// ```
pub fn is_irreducible<G>(graph: &G) -> bool
where
    G: Successors + Predecessors,
{
    let dom_tree = build_dominator_tree(graph);
    find_back_edges(graph)
        .into_iter()
        .any(|(latch, header)| dom_tree.is_reachable(latch) && !dom_tree.dominates(header, latch))
}
