#![no_main]

use libfuzzer_sys::fuzz_target;
use cfgreduce::{
    analysis::{split_irreducible_graph, GraphCopyBackend},
    utils::graph::{algorithms::is_irreducible, DirectedGraph},
};

// First byte is the node count, then pairs of bytes are edges
fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let node_count = usize::from(count % 24) + 1;
    let edges = rest
        .chunks_exact(2)
        .map(|pair| (usize::from(pair[0]) % node_count, usize::from(pair[1]) % node_count));
    let graph = DirectedGraph::from_edges(node_count, edges);

    let weights = vec![1; node_count];
    let mut backend = GraphCopyBackend::new(&graph);
    let result = split_irreducible_graph(&graph, &weights, &mut backend)
        .expect("conversion of a single-entry graph failed");
    assert!(!is_irreducible(result.graph()));
});
