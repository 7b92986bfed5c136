//! End-to-end conversion tests.
//!
//! These tests drive the public API the way a compiler would:
//! 1. Describe a control-flow graph by its edges
//! 2. Inspect dominators and reducibility
//! 3. Convert it through a splitting backend
//! 4. Verify the result against the backend's own view of the program

use cfgreduce::{
    analysis::{
        convert_batch, split_irreducible_graph, ConversionJob, ConversionResult, ConverterConfig,
        DjGraph, GraphCopyBackend, GraphSplittingBackend, IrreducibleGraphConverter, SplitCall,
    },
    utils::graph::{
        algorithms::{
            build_dominator_tree, compute_dominance_frontiers, find_back_edges, is_irreducible,
        },
        DirectedGraph, GraphBase, NodeId,
    },
    Error, Result,
};

fn n(index: usize) -> NodeId {
    NodeId::new(index)
}

/// Checks the bookkeeping every conversion result must satisfy.
fn check_result(input: &DirectedGraph, weights: &[u64], result: &ConversionResult) {
    assert!(!is_irreducible(result.graph()));
    assert_eq!(result.original_count(), input.node_count());
    assert_eq!(&result.weights()[..weights.len()], weights);

    for node in result.graph().node_ids() {
        let original = result.original_of(node).unwrap();
        assert!(original.index() < input.node_count());
        if result.is_copy(node) {
            assert!(result.copies_of(original).contains(&node));
            assert_eq!(result.weights()[node.index()], weights[original.index()]);
        } else {
            assert_eq!(original, node);
        }
    }
}

/// Refuses every split, like a backend running out of space.
struct RefusingBackend;

impl GraphSplittingBackend for RefusingBackend {
    fn split(&mut self, _domain: &[NodeId], nodes: &[NodeId]) -> Result<Vec<NodeId>> {
        Err(Error::Backend(format!("cannot duplicate {} nodes", nodes.len())))
    }
}

#[test]
fn test_single_header_loop_is_reducible() -> Result<()> {
    // 1 is the only entry of the loop 1 -> 3 -> 1
    let cfg = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (2, 1), (1, 3), (3, 1)]);
    assert!(!is_irreducible(&cfg));

    let dom = build_dominator_tree(&cfg);
    assert!(dom.dominates(n(1), n(3)));
    assert_eq!(find_back_edges(&cfg), vec![(n(3), n(1))]);

    let mut backend = GraphCopyBackend::new(&cfg);
    let result = split_irreducible_graph(&cfg, &[1; 4], &mut backend)?;
    assert_eq!(result.split_count(), 0);
    assert_eq!(result.graph(), &cfg);
    Ok(())
}

#[test]
fn test_loop_entered_through_join() -> Result<()> {
    // 3 is entered from 1 and 2, and 3 -> 1 closes a loop that 0 also enters at 1
    let cfg = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 1)]);
    assert!(is_irreducible(&cfg));

    let weights = [1; 4];
    let mut backend = GraphCopyBackend::new(&cfg);
    let result = split_irreducible_graph(&cfg, &weights, &mut backend)?;

    check_result(&cfg, &weights, &result);
    assert_eq!(result.split_count(), 1);
    assert_eq!(result.copies_of(n(3)), &[n(4)]);
    assert_eq!(
        result.graph(),
        &DirectedGraph::from_edges(5, [(0, 1), (0, 2), (1, 4), (2, 3), (3, 1), (4, 1)])
    );
    Ok(())
}

#[test]
fn test_loop_without_dominating_header() -> Result<()> {
    let cfg = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 1), (3, 2)]);
    assert!(is_irreducible(&cfg));

    let weights = [1; 4];
    let mut backend = GraphCopyBackend::new(&cfg);
    let result = split_irreducible_graph(&cfg, &weights, &mut backend)?;

    check_result(&cfg, &weights, &result);
    assert_eq!(
        backend.calls(),
        &[SplitCall {
            domain: vec![n(1)],
            nodes: vec![n(2), n(3)],
            copies: vec![n(4), n(5)],
        }]
    );
    assert_eq!(result.graph(), &backend.graph().to_graph());
    Ok(())
}

#[test]
fn test_unreachable_nodes() -> Result<()> {
    // 2 and 3 form a loop nothing reaches, and 2 also jumps into the live loop
    let cfg = DirectedGraph::from_edges(5, [(0, 1), (1, 4), (4, 1), (2, 3), (3, 2), (2, 4)]);

    let dom = build_dominator_tree(&cfg);
    assert_eq!(dom.immediate_dominator(n(2)), None);
    assert_eq!(dom.immediate_dominator(n(3)), None);
    assert!(!dom.is_reachable(n(2)));

    let frontiers = compute_dominance_frontiers(&cfg, &dom);
    for frontier in &frontiers {
        assert!(!frontier.contains(&n(2)));
        assert!(!frontier.contains(&n(3)));
    }

    let dj = DjGraph::new(&cfg, &[1; 5])?;
    assert_eq!(dj.level_of(n(2)), None);

    let mut backend = GraphCopyBackend::new(&cfg);
    let result = split_irreducible_graph(&cfg, &[1; 5], &mut backend)?;
    assert_eq!(result.split_count(), 0);
    assert_eq!(result.graph(), &cfg);
    Ok(())
}

#[test]
fn test_weights_decide_kept_domain() -> Result<()> {
    let cfg = DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 1), (3, 2)]);
    let weights = [1, 1, 50, 1];
    let mut backend = GraphCopyBackend::new(&cfg);
    let result = split_irreducible_graph(&cfg, &weights, &mut backend)?;

    check_result(&cfg, &weights, &result);
    assert_eq!(backend.calls()[0].domain, vec![n(2)]);
    assert!(result.copies_of(n(2)).is_empty());
    Ok(())
}

#[test]
fn test_complete_loop_matches_backend() -> Result<()> {
    let mut edges = Vec::new();
    for from in 1..=4 {
        edges.push((0, from));
        for to in 1..=4 {
            if from != to {
                edges.push((from, to));
            }
        }
    }
    let cfg = DirectedGraph::from_edges(5, edges);
    let weights = [1, 2, 3, 4, 5];

    let mut backend = GraphCopyBackend::new(&cfg);
    let result = split_irreducible_graph(&cfg, &weights, &mut backend)?;

    check_result(&cfg, &weights, &result);
    assert_eq!(result.split_count(), backend.calls().len());
    assert_eq!(result.graph(), &backend.graph().to_graph());
    assert!(result.copy_count() > 0);
    Ok(())
}

#[test]
fn test_backend_error_is_propagated() {
    let cfg = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
    let result = split_irreducible_graph(&cfg, &[1; 3], &mut RefusingBackend);
    assert!(matches!(result, Err(Error::Backend(message)) if message.contains("1 nodes")));
}

#[test]
fn test_boxed_backend() -> Result<()> {
    let cfg = DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]);
    let mut backend: Box<dyn GraphSplittingBackend> = Box::new(GraphCopyBackend::new(&cfg));

    let converter = IrreducibleGraphConverter::new();
    let result = converter.convert(&cfg, &[1; 3], backend.as_mut())?;
    assert_eq!(result.split_count(), 1);
    Ok(())
}

#[test]
fn test_batch_conversion() {
    let graphs = [
        DirectedGraph::from_edges(3, [(0, 1), (0, 2), (1, 2), (2, 1)]),
        DirectedGraph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 1), (3, 2)]),
        DirectedGraph::from_edges(3, [(0, 1), (1, 2), (2, 1)]),
    ];
    let mut jobs: Vec<_> = graphs
        .iter()
        .map(|graph| {
            ConversionJob::new(
                graph.clone(),
                vec![1; graph.node_count()],
                GraphCopyBackend::new(graph),
            )
        })
        .collect();

    let results = convert_batch(&mut jobs, &ConverterConfig::default());
    for ((graph, job), result) in graphs.iter().zip(&jobs).zip(results) {
        let result = result.unwrap();
        check_result(graph, &job.weights, &result);
        assert_eq!(result.graph(), &job.backend.graph().to_graph());
    }
}
