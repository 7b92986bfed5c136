//! DJ-graphs: control-flow graphs annotated with their dominator tree.
//!
//! A DJ-graph combines the edges of a control-flow graph (J, join edges) with the edges of
//! its dominator tree (D). Classifying every CFG edge against the dominator tree and
//! against a depth-first spanning tree of the combined graph exposes irreducible loops:
//! a loop with several entries shows up as an edge that is a *cross join* in the
//! dominator sense and a *back edge* in the spanning tree at the same time.
//!
//! # Collapsing
//!
//! The converter works bottom-up and summarizes every resolved region into a single
//! representative. [`DjGraph::collapse`] merges a set of nodes into their common
//! dominator: the *merge class* of the representative absorbs the classes of the
//! collapsed nodes and all edges are rewired onto it. After a collapse every query
//! resolves its arguments through [`DjGraph::class_of`], so callers may keep using the
//! original node ids.

use log::{debug, log_enabled, trace, Level};
use strum::{EnumCount, EnumIter};

use crate::{
    utils::graph::{
        algorithms::{build_dominator_tree, DominatorTree},
        GraphBase, LcaTree, MutableDirectedGraph, NodeId, Predecessors, Successors,
    },
    Error, Result,
};

/// Classification of a control-flow edge relative to the dominator tree.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::analysis::{DjGraph, EdgeKind};
/// use cfgreduce::utils::graph::{DirectedGraph, NodeId};
///
/// let cfg = DirectedGraph::from_edges(3, [(0, 1), (1, 2), (2, 1)]);
/// let dj = DjGraph::new(&cfg, &[1, 1, 1])?;
///
/// assert_eq!(dj.edge_kind(NodeId::new(0), NodeId::new(1)), EdgeKind::Dom);
/// assert_eq!(dj.edge_kind(NodeId::new(2), NodeId::new(1)), EdgeKind::BackJoin);
/// # Ok::<(), cfgreduce::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumCount, EnumIter)]
pub enum EdgeKind {
    /// The source is the immediate dominator of the target
    Dom,
    /// A join edge whose target dominates its source, closing a single-entry loop
    BackJoin,
    /// Any other join edge
    CrossJoin,
}

/// A control-flow graph combined with its dominator tree, supporting node collapsing.
///
/// The DJ-graph owns a working copy of the CFG and of the combined CFG + dominator edge
/// graph. Both copies are rewired by [`DjGraph::collapse`]; the dominator tree and the
/// spanning tree are computed once and queried through the merge classes afterwards.
///
/// Nodes that are unreachable from node 0 have no dominator tree level, never appear in
/// [`DjGraph::level`] and only dominate themselves.
///
/// # Thread Safety
///
/// `DjGraph` is [`Send`] and [`Sync`]. It is mutated only through `&mut self`.
#[derive(Debug, Clone)]
pub struct DjGraph {
    /// Working copy of the control-flow graph
    cfg: MutableDirectedGraph,
    /// Control-flow edges plus dominator tree edges
    graph: MutableDirectedGraph,
    dom: DominatorTree,
    /// Depth-first spanning tree of `graph`, rooted at node 0
    spanning: LcaTree,
    spanning_index: Vec<Option<usize>>,
    /// Reachable nodes bucketed by dominator tree depth
    levels: Vec<Vec<NodeId>>,
    merge_root: Vec<NodeId>,
    merge_class: Vec<Vec<NodeId>>,
    weights: Vec<u64>,
}

impl DjGraph {
    /// Builds the DJ-graph of a control-flow graph entered at node 0.
    ///
    /// # Arguments
    ///
    /// * `cfg` - The control-flow graph
    /// * `weights` - One profile weight per node
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeightMismatch`] if `weights` does not have one entry per node.
    pub fn new<G>(cfg: &G, weights: &[u64]) -> Result<Self>
    where
        G: Successors + Predecessors,
    {
        let node_count = cfg.node_count();
        if weights.len() != node_count {
            return Err(Error::WeightMismatch {
                expected: node_count,
                actual: weights.len(),
            });
        }

        let dom = build_dominator_tree(cfg);
        let cfg_copy = MutableDirectedGraph::from_graph(cfg);

        let mut graph = cfg_copy.clone();
        let mut levels: Vec<Vec<NodeId>> = Vec::new();
        for &node in dom.tree_order() {
            if let Some(idom) = dom.immediate_dominator(node) {
                graph.add_edge(idom, node);
            }
            if let Some(depth) = dom.depth(node) {
                if levels.len() <= depth {
                    levels.resize_with(depth + 1, Vec::new);
                }
                levels[depth].push(node);
            }
        }
        for level in &mut levels {
            level.sort_unstable();
        }

        let (spanning, spanning_index) = Self::spanning_tree(&graph);

        let dj = DjGraph {
            cfg: cfg_copy,
            graph,
            dom,
            spanning,
            spanning_index,
            levels,
            merge_root: (0..node_count).map(NodeId::new).collect(),
            merge_class: (0..node_count).map(|i| vec![NodeId::new(i)]).collect(),
            weights: weights.to_vec(),
        };

        if log_enabled!(Level::Debug) {
            let stats = dj.edge_statistics();
            debug!(
                "DJ-graph of {} nodes, {} levels: {} dom, {} back-join, {} cross-join edges",
                node_count,
                dj.level_count(),
                stats[EdgeKind::Dom as usize],
                stats[EdgeKind::BackJoin as usize],
                stats[EdgeKind::CrossJoin as usize]
            );
        }

        Ok(dj)
    }

    /// Runs a depth-first traversal from node 0 and records its spanning tree.
    fn spanning_tree(graph: &MutableDirectedGraph) -> (LcaTree, Vec<Option<usize>>) {
        let node_count = graph.node_count();
        let mut tree = LcaTree::new(node_count);
        let mut index = vec![None; node_count];
        if node_count == 0 {
            return (tree, index);
        }

        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(NodeId::ENTRY, None)];
        while let Some((node, parent)) = stack.pop() {
            if index[node.index()].is_some() {
                continue;
            }
            let position = match parent {
                Some(parent) => tree.add_node(parent),
                None => 0,
            };
            index[node.index()] = Some(position);

            let successors: Vec<NodeId> = graph.successors(node).collect();
            for &succ in successors.iter().rev() {
                if index[succ.index()].is_none() {
                    stack.push((succ, Some(position)));
                }
            }
        }

        (tree, index)
    }

    /// Returns the size of the node id space.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.merge_root.len()
    }

    /// Returns the representative of the merge class containing `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is outside of the graph.
    #[must_use]
    pub fn class_of(&self, node: NodeId) -> NodeId {
        self.merge_root[node.index()]
    }

    /// Checks whether `node` still represents its own merge class.
    #[must_use]
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.class_of(node) == node
    }

    /// Returns all original nodes represented by `node`'s merge class.
    #[must_use]
    pub fn class_members(&self, node: NodeId) -> &[NodeId] {
        &self.merge_class[self.class_of(node).index()]
    }

    /// Returns the working copy of the control-flow graph.
    #[must_use]
    pub fn cfg(&self) -> &MutableDirectedGraph {
        &self.cfg
    }

    /// Returns the combined control-flow and dominator edge graph.
    #[must_use]
    pub fn graph(&self) -> &MutableDirectedGraph {
        &self.graph
    }

    /// Returns the dominator tree of the original control-flow graph.
    #[must_use]
    pub fn dom_tree(&self) -> &DominatorTree {
        &self.dom
    }

    /// Returns the immediate dominator of `node`'s class, resolved to its class.
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        self.dom
            .immediate_dominator(self.class_of(node))
            .map(|idom| self.class_of(idom))
    }

    /// Checks whether the class of `a` dominates the class of `b`.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        self.dom.dominates(self.class_of(a), self.class_of(b))
    }

    /// Returns the class of the nearest common dominator of `a` and `b`.
    #[must_use]
    pub fn common_dominator(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        self.dom
            .common_dominator(self.class_of(a), self.class_of(b))
            .map(|dom| self.class_of(dom))
    }

    /// Returns the class of the nearest node dominating every node of `nodes`.
    ///
    /// Returns `None` for an empty slice or if any node is unreachable.
    #[must_use]
    pub fn common_dominator_of(&self, nodes: &[NodeId]) -> Option<NodeId> {
        let (&first, rest) = nodes.split_first()?;
        if !self.dom.is_reachable(self.class_of(first)) {
            return None;
        }
        rest.iter().try_fold(self.class_of(first), |acc, &node| {
            self.common_dominator(acc, node)
        })
    }

    /// Classifies the edge `from -> to`.
    #[must_use]
    pub fn edge_kind(&self, from: NodeId, to: NodeId) -> EdgeKind {
        if self.immediate_dominator(to) == Some(self.class_of(from)) {
            EdgeKind::Dom
        } else if self.dominates(to, from) {
            EdgeKind::BackJoin
        } else {
            EdgeKind::CrossJoin
        }
    }

    /// Checks whether `from` is the immediate dominator of `to`.
    #[must_use]
    pub fn is_dom_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edge_kind(from, to) == EdgeKind::Dom
    }

    /// Checks whether `from -> to` is a join edge, i.e. not a dominator edge.
    #[must_use]
    pub fn is_join_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edge_kind(from, to) != EdgeKind::Dom
    }

    /// Checks whether `from -> to` is a join edge whose target dominates its source.
    #[must_use]
    pub fn is_back_join(&self, from: NodeId, to: NodeId) -> bool {
        self.edge_kind(from, to) == EdgeKind::BackJoin
    }

    /// Checks whether `from -> to` is a join edge that is not a back join.
    #[must_use]
    pub fn is_cross_join(&self, from: NodeId, to: NodeId) -> bool {
        self.edge_kind(from, to) == EdgeKind::CrossJoin
    }

    /// Checks whether `to` is an ancestor of `from` in the spanning tree.
    ///
    /// Nodes outside of the spanning tree have no spanning relations.
    #[must_use]
    pub fn is_spanning_back(&self, from: NodeId, to: NodeId) -> bool {
        match (self.spanning_position(from), self.spanning_position(to)) {
            (Some(a), Some(b)) => self.spanning.lca(a, b) == b,
            _ => false,
        }
    }

    /// Checks whether neither node is an ancestor of the other in the spanning tree.
    #[must_use]
    pub fn is_spanning_cross(&self, from: NodeId, to: NodeId) -> bool {
        match (self.spanning_position(from), self.spanning_position(to)) {
            (Some(a), Some(b)) => {
                let lca = self.spanning.lca(a, b);
                lca != a && lca != b
            }
            _ => false,
        }
    }

    fn spanning_position(&self, node: NodeId) -> Option<usize> {
        self.spanning_index[self.class_of(node).index()]
    }

    /// Returns the original nodes at dominator tree depth `level`, in ascending order.
    ///
    /// The buckets are fixed at construction; callers filter collapsed nodes with
    /// [`DjGraph::is_alive`].
    #[must_use]
    pub fn level(&self, level: usize) -> &[NodeId] {
        self.levels.get(level).map_or(&[], Vec::as_slice)
    }

    /// Returns the number of dominator tree levels.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Returns the dominator tree depth of `node`'s class.
    #[must_use]
    pub fn level_of(&self, node: NodeId) -> Option<usize> {
        self.dom.depth(self.class_of(node))
    }

    /// Returns the accumulated weight of `node`'s class.
    #[must_use]
    pub fn weight_of(&self, node: NodeId) -> u64 {
        self.weights[self.class_of(node).index()]
    }

    /// Adds `weight` to `node`'s class.
    pub fn add_weight(&mut self, node: NodeId, weight: u64) {
        let root = self.class_of(node);
        self.weights[root.index()] += weight;
    }

    /// Counts the live control-flow edges per [`EdgeKind`], indexed by `kind as usize`.
    #[must_use]
    pub fn edge_statistics(&self) -> [usize; EdgeKind::COUNT] {
        let mut stats = [0; EdgeKind::COUNT];
        for from in self.cfg.node_ids() {
            for to in self.cfg.successors(from) {
                stats[self.edge_kind(from, to) as usize] += 1;
            }
        }
        stats
    }

    /// Merges the classes of `nodes` into their common dominator.
    ///
    /// Weights and merge classes are accumulated on the representative. Every edge of a
    /// collapsed class is moved onto the representative in both the CFG copy and the
    /// combined graph; edges between collapsed classes disappear, except that an edge
    /// back into the representative becomes a self loop. Collapsing a single class is a
    /// no-op.
    ///
    /// # Returns
    ///
    /// The representative of the merged class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCollapse`] if `nodes` is empty or if the common dominator
    /// of the classes is not one of them.
    pub fn collapse(&mut self, nodes: &[NodeId]) -> Result<NodeId> {
        let mut classes: Vec<NodeId> = nodes.iter().map(|&node| self.class_of(node)).collect();
        classes.sort_unstable();
        classes.dedup();

        let top = match classes.as_slice() {
            [] => return Err(Error::InvalidCollapse("empty node set".to_string())),
            [single] => return Ok(*single),
            _ => self.common_dominator_of(&classes).ok_or_else(|| {
                Error::InvalidCollapse(format!("{classes:?} have no common dominator"))
            })?,
        };
        if classes.binary_search(&top).is_err() {
            return Err(Error::InvalidCollapse(format!(
                "common dominator {top} of {classes:?} is not part of the set"
            )));
        }

        for &class in &classes {
            if class == top {
                continue;
            }
            let members = std::mem::take(&mut self.merge_class[class.index()]);
            for &member in &members {
                self.merge_root[member.index()] = top;
            }
            self.merge_class[top.index()].extend(members);
            let weight = std::mem::take(&mut self.weights[class.index()]);
            self.weights[top.index()] += weight;
        }

        for &class in &classes {
            if class == top {
                continue;
            }
            Self::redirect(&mut self.cfg, &self.merge_root, class, top);
            Self::redirect(&mut self.graph, &self.merge_root, class, top);
        }

        trace!("collapsed {} classes into {}", classes.len(), top);
        Ok(top)
    }

    /// Moves all edges of `node` onto `top` and detaches `node`.
    fn redirect(graph: &mut MutableDirectedGraph, roots: &[NodeId], node: NodeId, top: NodeId) {
        let successors: Vec<NodeId> = graph.successors(node).collect();
        for succ in successors {
            let target = roots[succ.index()];
            if target != top || succ == top {
                graph.add_edge(top, target);
            }
        }

        let predecessors: Vec<NodeId> = graph.predecessors(node).collect();
        for pred in predecessors {
            let source = roots[pred.index()];
            if source != top {
                graph.add_edge(source, top);
            }
        }

        graph.detach_node(node);
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::utils::graph::DirectedGraph;

    fn n(index: usize) -> NodeId {
        NodeId::new(index)
    }

    /// Loop body 1 <-> 2 entered from 0 at both nodes.
    fn irreducible_pair() -> DirectedGraph {
        DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 2), (2, 1), (2, 3)])
    }

    #[test]
    fn test_weight_mismatch() {
        let cfg = irreducible_pair();
        match DjGraph::new(&cfg, &[1, 2, 3]) {
            Err(Error::WeightMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (4, 3));
            }
            other => panic!("unexpected: {:?}", other.map(|dj| dj.node_count())),
        }
    }

    #[test]
    fn test_levels() {
        let cfg = DirectedGraph::from_edges(5, [(0, 1), (1, 2), (1, 3), (4, 0)]);
        let dj = DjGraph::new(&cfg, &[1; 5]).unwrap();

        assert_eq!(dj.level_count(), 3);
        assert_eq!(dj.level(0), &[n(0)]);
        assert_eq!(dj.level(1), &[n(1)]);
        assert_eq!(dj.level(2), &[n(2), n(3)]);
        assert!(dj.level(3).is_empty());
        assert_eq!(dj.level_of(n(3)), Some(2));
        assert_eq!(dj.level_of(n(4)), None);
    }

    #[test]
    fn test_edge_kinds() {
        let cfg = irreducible_pair();
        let dj = DjGraph::new(&cfg, &[1; 4]).unwrap();

        assert_eq!(dj.edge_kind(n(0), n(1)), EdgeKind::Dom);
        assert_eq!(dj.edge_kind(n(1), n(2)), EdgeKind::CrossJoin);
        assert_eq!(dj.edge_kind(n(2), n(1)), EdgeKind::CrossJoin);
        assert_eq!(dj.edge_kind(n(2), n(3)), EdgeKind::Dom);
        assert!(dj.is_join_edge(n(1), n(2)));
        assert!(!dj.is_back_join(n(1), n(2)));
    }

    #[test]
    fn test_back_join_self_loop() {
        let cfg = DirectedGraph::from_edges(2, [(0, 1), (1, 1)]);
        let dj = DjGraph::new(&cfg, &[0, 0]).unwrap();

        assert!(dj.is_back_join(n(1), n(1)));
        assert!(dj.is_spanning_back(n(1), n(1)));
    }

    #[test]
    fn test_spanning_relations() {
        let cfg = irreducible_pair();
        let dj = DjGraph::new(&cfg, &[1; 4]).unwrap();

        // The traversal enters 1 first and reaches 2 through it
        assert!(dj.is_spanning_back(n(2), n(1)));
        assert!(!dj.is_spanning_back(n(1), n(2)));
        assert!(dj.is_cross_join(n(2), n(1)));
        assert!(!dj.is_spanning_cross(n(2), n(1)));
    }

    #[test]
    fn test_spanning_cross() {
        let cfg = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)]);
        let dj = DjGraph::new(&cfg, &[1; 4]).unwrap();

        // 3 hangs below 1 in the spanning tree, so 2 -> 3 crosses
        assert!(dj.is_spanning_cross(n(2), n(3)));
        assert!(dj.is_spanning_cross(n(1), n(2)));
    }

    #[test]
    fn test_unreachable_nodes() {
        let cfg = DirectedGraph::from_edges(3, [(0, 1), (2, 1)]);
        let dj = DjGraph::new(&cfg, &[1; 3]).unwrap();

        assert!(!dj.is_spanning_back(n(2), n(1)));
        assert!(!dj.is_spanning_cross(n(2), n(1)));
        assert_eq!(dj.immediate_dominator(n(2)), None);
        assert_eq!(dj.common_dominator_of(&[n(1), n(2)]), None);
        assert_eq!(dj.edge_kind(n(2), n(1)), EdgeKind::CrossJoin);
    }

    #[test]
    fn test_collapse_loop() {
        // 0 -> 1 -> 2 -> 1, 2 -> 3
        let cfg = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 1), (2, 3)]);
        let mut dj = DjGraph::new(&cfg, &[1, 2, 3, 4]).unwrap();

        let top = dj.collapse(&[n(2), n(1)]).unwrap();
        assert_eq!(top, n(1));
        assert_eq!(dj.class_of(n(2)), n(1));
        assert!(!dj.is_alive(n(2)));
        assert_eq!(dj.class_members(n(2)), &[n(1), n(2)]);
        assert_eq!(dj.weight_of(n(2)), 5);

        // Exit moved onto the representative, back edge became a self loop
        assert!(dj.cfg().has_edge(n(1), n(3)));
        assert!(dj.cfg().has_edge(n(1), n(1)));
        assert_eq!(dj.cfg().successor_count(n(2)), 0);
        assert_eq!(dj.cfg().predecessor_count(n(2)), 0);
        assert!(dj.graph().has_edge(n(1), n(3)));

        // Queries resolve through the class
        assert_eq!(dj.immediate_dominator(n(3)), Some(n(1)));
        assert_eq!(dj.level_of(n(2)), Some(1));
    }

    #[test]
    fn test_collapse_without_dominating_member() {
        let cfg = irreducible_pair();
        let mut dj = DjGraph::new(&cfg, &[1; 4]).unwrap();

        assert!(matches!(
            dj.collapse(&[n(1), n(2)]),
            Err(Error::InvalidCollapse(_))
        ));
        assert!(matches!(dj.collapse(&[]), Err(Error::InvalidCollapse(_))));
        // Nothing changed
        assert!(dj.is_alive(n(1)) && dj.is_alive(n(2)));
    }

    #[test]
    fn test_collapse_leaf_is_noop() {
        let cfg = DirectedGraph::from_edges(3, [(0, 1), (1, 2)]);
        let mut dj = DjGraph::new(&cfg, &[1; 3]).unwrap();
        let before = dj.cfg().clone();

        assert_eq!(dj.collapse(&[n(2)]).unwrap(), n(2));
        assert_eq!(dj.collapse(&[n(2), n(2)]).unwrap(), n(2));
        assert_eq!(dj.cfg(), &before);
    }

    #[test]
    fn test_collapse_twice() {
        let cfg = DirectedGraph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 1)]);
        let mut dj = DjGraph::new(&cfg, &[1; 4]).unwrap();

        dj.collapse(&[n(2), n(3)]).unwrap();
        let top = dj.collapse(&[n(3), n(1)]).unwrap();

        assert_eq!(top, n(1));
        assert_eq!(dj.class_members(n(3)), &[n(1), n(2), n(3)]);
        assert_eq!(dj.weight_of(n(1)), 3);
        assert!(dj.cfg().has_edge(n(1), n(1)));
        assert!(dj.cfg().has_edge(n(0), n(1)));
    }

    #[test]
    fn test_edge_statistics() {
        let cfg = irreducible_pair();
        let dj = DjGraph::new(&cfg, &[1; 4]).unwrap();
        let stats = dj.edge_statistics();

        assert_eq!(stats.iter().sum::<usize>(), cfg.edge_count());
        assert_eq!(stats[EdgeKind::Dom as usize], 3);
        assert_eq!(stats[EdgeKind::CrossJoin as usize], 2);
        assert_eq!(EdgeKind::iter().count(), EdgeKind::COUNT);
        assert_eq!(EdgeKind::BackJoin.to_string(), "BackJoin");
    }
}
