//! Strongly Connected Components (SCC) using Tarjan's algorithm.
//!
//! A strongly connected component is a maximal set of vertices such that there is a
//! path from every vertex to every other vertex in the set. Every loop of a
//! control-flow graph lives inside one component, which makes SCCs the unit of work
//! of the irreducible-loop converter.
//!
//! The implementation runs Tarjan's algorithm on an explicit stack of frames, so deep
//! graphs (long chains of basic blocks) never exhaust the native call stack.

use crate::utils::graph::{NodeId, Successors};

/// Computes the strongly connected components of a directed graph.
///
/// Only nodes reported by [`GraphBase::node_ids`](crate::utils::graph::GraphBase::node_ids)
/// are considered, so running this on a filtered view yields the components of the
/// induced subgraph.
///
/// # Arguments
///
/// * `graph` - The directed graph to analyze
///
/// # Returns
///
/// A vector of SCCs, where each SCC is a vector of `NodeId`s. Single nodes form their
/// own component, with or without a self loop. The SCCs are returned in **reverse
/// topological order** (if there's an edge from SCC A to SCC B, then A appears after B
/// in the result).
///
/// # Complexity
///
/// - Time: O(V + E)
/// - Space: O(V)
///
/// # Algorithm
///
/// 1. Perform DFS, assigning each node an index in discovery order
/// 2. Compute lowlink values (minimum index reachable via DFS subtree + back edges)
/// 3. When lowlink[v] == index[v], v is root of an SCC; pop stack until v
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::{algorithms::strongly_connected_components, DirectedGraph};
///
/// // Simple cycle: 0 -> 1 -> 2 -> 0, plus the exit 2 -> 3
/// let graph = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 0), (2, 3)]);
///
/// let sccs = strongly_connected_components(&graph);
/// assert_eq!(sccs.len(), 2);
/// // The exit comes first, the loop it is reached from after it
/// assert_eq!(sccs[0].len(), 1);
/// assert_eq!(sccs[1].len(), 3);
/// ```
pub fn strongly_connected_components<G>(graph: &G) -> Vec<Vec<NodeId>>
where
    G: Successors,
{
    let node_count = graph.node_count();
    if node_count == 0 {
        return Vec::new();
    }

    let mut state = TarjanState::new(node_count);
    let roots: Vec<NodeId> = graph.node_ids().collect();
    for root in roots {
        if state.index[root.index()].is_none() {
            state.strongconnect(graph, root);
        }
    }

    state.sccs
}

/// A node whose successors are being explored.
struct Frame {
    node: NodeId,
    successors: Vec<NodeId>,
    position: usize,
}

/// Internal state for Tarjan's algorithm.
struct TarjanState {
    /// Discovery index for each node (None if not yet visited)
    index: Vec<Option<usize>>,
    /// Lowlink value for each node
    lowlink: Vec<usize>,
    /// Whether a node is currently on the stack
    on_stack: Vec<bool>,
    /// The component stack
    stack: Vec<NodeId>,
    /// Current index counter
    current_index: usize,
    /// Collected SCCs
    sccs: Vec<Vec<NodeId>>,
}

impl TarjanState {
    fn new(n: usize) -> Self {
        Self {
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            current_index: 0,
            sccs: Vec::new(),
        }
    }

    fn enter<G: Successors>(&mut self, graph: &G, node: NodeId) -> Frame {
        let idx = node.index();
        self.index[idx] = Some(self.current_index);
        self.lowlink[idx] = self.current_index;
        self.current_index += 1;
        self.stack.push(node);
        self.on_stack[idx] = true;

        Frame {
            node,
            successors: graph.successors(node).collect(),
            position: 0,
        }
    }

    fn strongconnect<G: Successors>(&mut self, graph: &G, root: NodeId) {
        let mut frames = vec![self.enter(graph, root)];

        while let Some(frame) = frames.last_mut() {
            let v = frame.node;

            if let Some(&w) = frame.successors.get(frame.position) {
                frame.position += 1;
                match self.index[w.index()] {
                    None => {
                        let child = self.enter(graph, w);
                        frames.push(child);
                    }
                    Some(w_index) if self.on_stack[w.index()] => {
                        self.lowlink[v.index()] = self.lowlink[v.index()].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if let Some(parent) = frames.last() {
                let p = parent.node.index();
                self.lowlink[p] = self.lowlink[p].min(self.lowlink[v.index()]);
            }

            if Some(self.lowlink[v.index()]) == self.index[v.index()] {
                let mut scc = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack[w.index()] = false;
                    scc.push(w);
                    if w == v {
                        break;
                    }
                }
                self.sccs.push(scc);
            }
        }
    }
}
