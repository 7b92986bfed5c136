//! Irreducible loop elimination by node splitting.
//!
//! The converter turns an arbitrary single-entry control-flow graph into a reducible one
//! by duplicating nodes. It follows the DJ-graph formulation: the dominator tree is
//! walked level by level from the deepest level up, and a level is irreducible if one
//! of its incoming edges is a cross join that is also a back edge of the spanning tree.
//!
//! # Algorithm
//!
//! For every level, deepest first:
//!
//! 1. If the level is irreducible, compute the strongly connected components of the
//!    live nodes at or below it. A component whose common dominator is one of its
//!    members is an ordinary loop and is collapsed. Any other component has several
//!    entries: its nodes are partitioned into *domains* (maximal chains of immediate
//!    dominators inside the component), the heaviest domain is kept and every other
//!    domain is duplicated through the [`GraphSplittingBackend`]. The region formed by
//!    the kept domain, the originals and the copies is rebuilt as a separate graph and
//!    converted recursively, since the duplicated domains may still form irreducible
//!    loops among themselves. Finally the component is collapsed into its common
//!    dominator.
//! 2. Every node at the level absorbs the nodes it dominates, so the next level up only
//!    sees one representative per dominator subtree.
//!
//! The converter tracks the real graph alongside the abstract one. Every split is
//! mirrored on it exactly as the backend performs it, and it is what the caller gets
//! back. A real graph that is still irreducible after the pass is an internal error.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, trace};

use crate::{
    analysis::{
        backend::redirect_split, ConversionResult, ConverterConfig, DjGraph,
        GraphSplittingBackend,
    },
    utils::{
        graph::{
            algorithms::{is_irreducible, strongly_connected_components},
            subgraph, DirectedGraph, GraphBase, GraphBuilder, MutableDirectedGraph, NodeId,
            Predecessors, Successors,
        },
        DisjointSet,
    },
    Error, Result,
};

/// Converts irreducible control-flow graphs into reducible ones.
///
/// The converter itself is stateless apart from its configuration; every call to
/// [`IrreducibleGraphConverter::convert`] allocates its own working graphs. One converter
/// can therefore serve any number of threads.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::analysis::{ConverterConfig, GraphCopyBackend, IrreducibleGraphConverter};
/// use cfgreduce::utils::graph::{algorithms::is_irreducible, DirectedGraph};
///
/// // Two entries into the loop 1 -> 3 -> 2 -> 3 -> 1
/// let cfg = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 1), (3, 2)]);
/// let config = ConverterConfig::new().with_max_depth(8);
/// let converter = IrreducibleGraphConverter::with_config(config);
///
/// let mut backend = GraphCopyBackend::new(&cfg);
/// let result = converter.convert(&cfg, &[1, 1, 1, 1], &mut backend)?;
///
/// assert!(!is_irreducible(result.graph()));
/// assert_eq!(result.split_count(), backend.calls().len());
/// # Ok::<(), cfgreduce::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct IrreducibleGraphConverter {
    config: ConverterConfig,
}

impl IrreducibleGraphConverter {
    /// Creates a converter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter with a custom configuration.
    #[must_use]
    pub fn with_config(config: ConverterConfig) -> Self {
        IrreducibleGraphConverter { config }
    }

    /// Returns the configuration of this converter.
    #[must_use]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Converts `graph` into a reducible graph, duplicating nodes through `backend`.
    ///
    /// Node 0 is the entry of the graph. Nodes unreachable from it are carried over
    /// unchanged and never split.
    ///
    /// # Arguments
    ///
    /// * `graph` - The control-flow graph to convert
    /// * `weights` - One profile weight per node; heavier domains are kept intact
    /// * `backend` - Performs the duplication on the caller's program
    ///
    /// # Errors
    ///
    /// - [`Error::WeightMismatch`] if `weights` does not have one entry per node
    /// - [`Error::NoCommonDominator`] if a loop has no common dominator
    /// - [`Error::InvalidBackendResult`] if the backend breaks its contract
    /// - [`Error::RecursionLimit`] if split regions nest deeper than configured
    /// - [`Error::Malformed`] if the converted graph is still irreducible
    /// - Any error returned by the backend
    pub fn convert<G, B>(
        &self,
        graph: &G,
        weights: &[u64],
        backend: &mut B,
    ) -> Result<ConversionResult>
    where
        G: Successors,
        B: GraphSplittingBackend + ?Sized,
    {
        let node_count = graph.node_count();
        if weights.len() != node_count {
            return Err(Error::WeightMismatch {
                expected: node_count,
                actual: weights.len(),
            });
        }

        let mut session = SplitSession::new(graph, weights, backend, &self.config);
        let snapshot = session.real.to_graph();
        let reals = snapshot.node_ids().map(|node| vec![node]).collect();
        session.split_loops(&snapshot, weights, reals, 0)?;
        ensure_reducible(&session.real)?;

        debug!(
            "converted graph of {} nodes with {} splits into {} nodes",
            node_count,
            session.split_count,
            session.real.node_count()
        );
        Ok(session.finish(node_count))
    }
}

/// Converts `graph` into a reducible graph with the default configuration.
///
/// # Errors
///
/// See [`IrreducibleGraphConverter::convert`].
pub fn split_irreducible_graph<G, B>(
    graph: &G,
    weights: &[u64],
    backend: &mut B,
) -> Result<ConversionResult>
where
    G: Successors,
    B: GraphSplittingBackend + ?Sized,
{
    IrreducibleGraphConverter::new().convert(graph, weights, backend)
}

/// Real nodes created while resolving a region, and the weight they add.
#[derive(Debug, Default)]
struct SplitOutcome {
    copied: Vec<NodeId>,
    additional: u64,
}

/// State of one conversion: the real graph and the copy bookkeeping.
struct SplitSession<'a, B: ?Sized> {
    backend: &'a mut B,
    config: &'a ConverterConfig,
    real: MutableDirectedGraph,
    real_weights: Vec<u64>,
    /// Input node each real node stems from
    originals: Vec<NodeId>,
    /// Copies of each input node
    copies: Vec<BTreeSet<NodeId>>,
    split_count: usize,
}

impl<'a, B: GraphSplittingBackend + ?Sized> SplitSession<'a, B> {
    fn new<G: Successors>(
        graph: &G,
        weights: &[u64],
        backend: &'a mut B,
        config: &'a ConverterConfig,
    ) -> Self {
        let node_count = graph.node_count();
        SplitSession {
            backend,
            config,
            real: MutableDirectedGraph::from_graph(graph),
            real_weights: weights.to_vec(),
            originals: (0..node_count).map(NodeId::new).collect(),
            copies: vec![BTreeSet::new(); node_count],
            split_count: 0,
        }
    }

    /// Makes `cfg` reducible, duplicating the real nodes behind its nodes as needed.
    ///
    /// `reals[n]` lists the real nodes abstract node `n` stands for.
    fn split_loops(
        &mut self,
        cfg: &DirectedGraph,
        weights: &[u64],
        mut reals: Vec<Vec<NodeId>>,
        depth: usize,
    ) -> Result<SplitOutcome> {
        if depth > self.config.max_depth {
            return Err(Error::RecursionLimit(self.config.max_depth));
        }

        let mut dj = DjGraph::new(cfg, weights)?;
        let mut outcome = SplitOutcome::default();
        // Live nodes below the current level that have not been absorbed yet
        let mut active: Vec<NodeId> = Vec::new();

        for level in (0..dj.level_count()).rev() {
            let candidates: Vec<NodeId> = dj
                .level(level)
                .iter()
                .chain(&active)
                .copied()
                .filter(|&node| dj.is_alive(node))
                .collect();

            if is_level_irreducible(&dj, &candidates) {
                debug!("depth {}: level {} is irreducible", depth, level);
                let components = {
                    let view = subgraph(dj.cfg(), |node| {
                        dj.is_alive(node) && dj.level_of(node).is_some_and(|l| l >= level)
                    });
                    strongly_connected_components(&view)
                };

                for mut component in components {
                    if component.len() < 2 {
                        continue;
                    }
                    component.sort_unstable();
                    self.resolve_component(&mut dj, &mut reals, &component, depth, &mut outcome)?;
                }
            } else {
                trace!("depth {}: level {} is reducible", depth, level);
            }

            active = absorb_into_level(&mut dj, &mut reals, level, &active)?;
        }

        Ok(outcome)
    }

    /// Resolves one strongly connected component of an irreducible level.
    fn resolve_component(
        &mut self,
        dj: &mut DjGraph,
        reals: &mut [Vec<NodeId>],
        component: &[NodeId],
        depth: usize,
        outcome: &mut SplitOutcome,
    ) -> Result<()> {
        let shared = dj
            .common_dominator_of(component)
            .ok_or_else(|| Error::NoCommonDominator(component.to_vec()))?;

        if component.binary_search(&shared).is_ok() {
            debug!(
                "depth {}: collapsing single-entry loop {:?} into {}",
                depth, component, shared
            );
            collapse_region(dj, reals, component)?;
            return Ok(());
        }

        let domains = partition_domains(dj, component, shared);
        let domain_count = domains.iter().max().map_or(0, |&max| max + 1);
        if domain_count < 2 {
            return Err(malformed_error!(
                "Irreducible component {:?} forms a single domain",
                component
            ));
        }

        let mut domain_weights = vec![0u64; domain_count];
        for (&node, &domain) in component.iter().zip(&domains) {
            domain_weights[domain] += dj.weight_of(node);
        }
        let kept = heaviest(&domain_weights);
        let duplicated: Vec<bool> = domains.iter().map(|&domain| domain != kept).collect();

        let mut kept_reals = Vec::new();
        let mut dup_reals = Vec::new();
        let mut copy_weight = 0u64;
        for (&node, &dup) in component.iter().zip(&duplicated) {
            if dup {
                dup_reals.extend_from_slice(&reals[node.index()]);
                copy_weight += dj.weight_of(node);
            } else {
                kept_reals.extend_from_slice(&reals[node.index()]);
            }
        }

        debug!(
            "depth {}: splitting {:?} below {}, keeping domain {} of {} (weight {})",
            depth, component, shared, kept, domain_count, domain_weights[kept]
        );
        let real_copies = self.split_real_nodes(&kept_reals, &dup_reals)?;

        let (region, region_weights, region_reals) =
            build_split_region(dj, reals, component, &duplicated, &dup_reals, &real_copies);
        let nested = self.split_loops(&region, &region_weights, region_reals, depth + 1)?;

        let mut members = component.to_vec();
        members.push(shared);
        let top = collapse_region(dj, reals, &members)?;

        let additional = copy_weight + nested.additional;
        dj.add_weight(top, additional);
        reals[top.index()].extend_from_slice(&real_copies);
        reals[top.index()].extend_from_slice(&nested.copied);

        outcome.copied.extend(real_copies);
        outcome.copied.extend(nested.copied);
        outcome.additional += additional;
        Ok(())
    }

    /// Asks the backend to duplicate `nodes` and mirrors the split on the real graph.
    fn split_real_nodes(&mut self, domain: &[NodeId], nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        let copies = self.backend.split(domain, nodes)?;
        if copies.len() != nodes.len() {
            return Err(Error::InvalidBackendResult(format!(
                "expected {} copies, received {}",
                nodes.len(),
                copies.len()
            )));
        }

        let size = self.real.node_count();
        let mut fresh = BTreeSet::new();
        for &copy in &copies {
            if copy.index() < size || !fresh.insert(copy) {
                return Err(Error::InvalidBackendResult(format!(
                    "copy {copy} is not a fresh node id"
                )));
            }
        }

        redirect_split(&mut self.real, domain, nodes, &copies);

        let new_size = self.real.node_count();
        self.originals
            .extend((self.originals.len()..new_size).map(NodeId::new));
        self.copies.resize_with(new_size, BTreeSet::new);
        self.real_weights.resize(new_size, 0);

        for (&node, &copy) in nodes.iter().zip(&copies) {
            let original = self.originals[node.index()];
            self.originals[copy.index()] = original;
            self.copies[original.index()].insert(copy);
            self.real_weights[copy.index()] = self.real_weights[node.index()];
        }

        self.split_count += 1;
        Ok(copies)
    }

    fn finish(self, original_count: usize) -> ConversionResult {
        ConversionResult {
            graph: self.real.to_graph(),
            weights: self.real_weights,
            originals: self.originals,
            copies: self
                .copies
                .into_iter()
                .map(|copies| copies.into_iter().collect())
                .collect(),
            split_count: self.split_count,
            original_count,
        }
    }
}

/// Fails if splitting left an irreducible loop behind.
fn ensure_reducible<G: Successors + Predecessors>(graph: &G) -> Result<()> {
    if is_irreducible(graph) {
        return Err(malformed_error!("Graph is still irreducible after splitting"));
    }
    Ok(())
}

/// Checks whether any candidate is entered by a cross join that closes a spanning tree cycle.
fn is_level_irreducible(dj: &DjGraph, candidates: &[NodeId]) -> bool {
    candidates.iter().any(|&node| {
        dj.cfg()
            .predecessors(node)
            .any(|pred| dj.is_cross_join(pred, node) && dj.is_spanning_back(pred, node))
    })
}

/// Labels every member of `component` with its domain.
///
/// A node shares the domain of its immediate dominator if that dominator is part of the
/// component. Labels are dense and numbered in order of first appearance.
fn partition_domains(dj: &DjGraph, component: &[NodeId], shared: NodeId) -> Vec<usize> {
    let mut domains = DisjointSet::with_elements(component.len());
    for (index, &node) in component.iter().enumerate() {
        let Some(idom) = dj.immediate_dominator(node) else {
            continue;
        };
        if idom == shared {
            continue;
        }
        if let Ok(position) = component.binary_search(&idom) {
            domains.union(index, position);
        }
    }
    domains.pack(component.len())
}

/// Returns the index of the first maximum.
fn heaviest(weights: &[u64]) -> usize {
    (0..weights.len()).fold(0, |best, index| {
        if weights[index] > weights[best] {
            index
        } else {
            best
        }
    })
}

/// Collapses `nodes` in the DJ-graph and moves their real nodes onto the representative.
fn collapse_region(
    dj: &mut DjGraph,
    reals: &mut [Vec<NodeId>],
    nodes: &[NodeId],
) -> Result<NodeId> {
    let mut roots: Vec<NodeId> = nodes.iter().map(|&node| dj.class_of(node)).collect();
    roots.sort_unstable();
    roots.dedup();
    debug_assert!(
        roots.len() > 1,
        "region {nodes:?} collapses into the single class {roots:?}"
    );

    let top = dj.collapse(&roots)?;
    for root in roots {
        if root != top {
            let moved = std::mem::take(&mut reals[root.index()]);
            reals[top.index()].extend(moved);
        }
    }
    Ok(top)
}

/// Merges the live nodes below `level` into their immediate dominator at `level`.
///
/// Returns the nodes that are live after the merge and have to be carried to the next
/// level up: the nodes of `level` itself, and the nodes whose immediate dominator sits
/// even higher.
fn absorb_into_level(
    dj: &mut DjGraph,
    reals: &mut [Vec<NodeId>],
    level: usize,
    active: &[NodeId],
) -> Result<Vec<NodeId>> {
    let mut groups: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    let mut remaining = Vec::new();
    for &node in active {
        if !dj.is_alive(node) {
            continue;
        }
        match dj.immediate_dominator(node) {
            Some(idom) if dj.level_of(idom) == Some(level) => {
                groups.entry(idom).or_default().push(node);
            }
            _ => remaining.push(node),
        }
    }

    for (top, mut members) in groups {
        members.push(top);
        collapse_region(dj, reals, &members)?;
    }

    remaining.extend(
        dj.level(level)
            .iter()
            .copied()
            .filter(|&node| dj.is_alive(node)),
    );
    Ok(remaining)
}

/// Builds the graph of a split region for the recursive conversion.
///
/// Node 0 is a fresh entry with an edge to every member entered from outside of the
/// component. Members follow as nodes `1..=n` in component order, then one copy per
/// duplicated member. Edges mirror the split: kept members enter duplicated members
/// through their copies, copies keep the edges of their originals.
fn build_split_region(
    dj: &DjGraph,
    reals: &[Vec<NodeId>],
    component: &[NodeId],
    duplicated: &[bool],
    dup_reals: &[NodeId],
    real_copies: &[NodeId],
) -> (DirectedGraph, Vec<u64>, Vec<Vec<NodeId>>) {
    let copy_of: HashMap<NodeId, NodeId> = dup_reals
        .iter()
        .copied()
        .zip(real_copies.iter().copied())
        .collect();

    let mut size = component.len() + 1;
    let mut copy_index = vec![None; component.len()];
    for (index, &dup) in duplicated.iter().enumerate() {
        if dup {
            copy_index[index] = Some(NodeId::new(size));
            size += 1;
        }
    }

    let mut builder = GraphBuilder::new(size);
    let mut weights = vec![0; size];
    let mut region_reals = vec![Vec::new(); size];

    for (index, &node) in component.iter().enumerate() {
        let original = NodeId::new(index + 1);
        weights[original.index()] = dj.weight_of(node);
        region_reals[original.index()] = reals[node.index()].clone();

        if let Some(copy) = copy_index[index] {
            weights[copy.index()] = dj.weight_of(node);
            region_reals[copy.index()] = reals[node.index()]
                .iter()
                .map(|real| copy_of.get(real).copied().unwrap_or(*real))
                .collect();
        }

        let entered = dj.cfg().predecessors(node).any(|pred| {
            component.binary_search(&pred).is_err() && dj.level_of(pred).is_some()
        });
        if entered {
            builder.add_edge(NodeId::ENTRY, original);
        }

        for succ in dj.cfg().successors(node) {
            let Ok(position) = component.binary_search(&succ) else {
                continue;
            };
            let target = NodeId::new(position + 1);
            match (copy_index[index], copy_index[position]) {
                (Some(from), Some(to)) => {
                    builder.add_edge(from, to);
                    builder.add_edge(original, target);
                }
                (None, Some(to)) => builder.add_edge(original, to),
                (Some(from), None) => {
                    builder.add_edge(from, target);
                    builder.add_edge(original, target);
                }
                (None, None) => builder.add_edge(original, target),
            }
        }
    }

    (builder.build(), weights, region_reals)
}
