//! DOT format utilities for graph visualization.
//!
//! This module renders graphs in DOT format, which can be viewed with Graphviz tools.
//! Every node gets one line listing its successors, including nodes without any, so
//! the output doubles as a compact textual adjacency dump in logs and test failures.

use std::fmt::Write;

use crate::utils::graph::{NodeId, Successors};

/// Escapes a string for safe use in DOT format labels and identifiers.
///
/// This function handles all characters that have special meaning in DOT format,
/// including quotes, backslashes, newlines, and angle brackets.
///
/// # Arguments
///
/// * `s` - The string to escape
///
/// # Returns
///
/// A new string with all special characters properly escaped.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::escape_dot;
///
/// let escaped = escape_dot("loop<1>");
/// assert_eq!(escaped, "loop\\<1\\>");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

/// Renders a graph in DOT format.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::{graph::DirectedGraph, to_dot};
///
/// let graph = DirectedGraph::from_edges(3, [(0, 1), (0, 2)]);
/// assert_eq!(to_dot(&graph), "digraph G {\n  0 -> {1, 2}\n  1 -> {}\n  2 -> {}\n}");
/// ```
#[must_use]
pub fn to_dot<G: Successors>(graph: &G) -> String {
    let mut out = String::from("digraph G {\n");
    for node in graph.node_ids() {
        let successors: Vec<String> = graph.successors(node).map(|s| s.to_string()).collect();
        let _ = writeln!(out, "  {} -> {{{}}}", node, successors.join(", "));
    }
    out.push('}');
    out
}

/// Renders a graph in DOT format with a label per node.
///
/// Labels are escaped with [`escape_dot`].
#[must_use]
pub fn to_dot_labeled<G, F>(graph: &G, label: F) -> String
where
    G: Successors,
    F: Fn(NodeId) -> String,
{
    let mut out = String::from("digraph G {\n");
    for node in graph.node_ids() {
        let _ = writeln!(out, "  {} [label=\"{}\"]", node, escape_dot(&label(node)));
    }
    for node in graph.node_ids() {
        for succ in graph.successors(node) {
            let _ = writeln!(out, "  {node} -> {succ}");
        }
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::graph::DirectedGraph;

    #[test]
    fn test_escape_dot_basic() {
        assert_eq!(escape_dot("hello"), "hello");
    }

    #[test]
    fn test_escape_dot_quotes() {
        assert_eq!(escape_dot("say \"hello\""), "say \\\"hello\\\"");
    }

    #[test]
    fn test_escape_dot_newlines() {
        assert_eq!(escape_dot("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_dot("line1\r\nline2"), "line1\\nline2");
    }

    #[test]
    fn test_escape_dot_combined() {
        assert_eq!(escape_dot("copy<\"3\">"), "copy\\<\\\"3\\\"\\>");
    }

    #[test]
    fn test_to_dot_empty() {
        let graph = DirectedGraph::new(0);
        assert_eq!(to_dot(&graph), "digraph G {\n}");
    }

    #[test]
    fn test_to_dot_cycle() {
        let graph = DirectedGraph::from_edges(2, [(0, 1), (1, 0), (1, 1)]);
        assert_eq!(to_dot(&graph), "digraph G {\n  0 -> {1}\n  1 -> {0, 1}\n}");
    }

    #[test]
    fn test_to_dot_labeled() {
        let graph = DirectedGraph::from_edges(2, [(0, 1)]);
        let dot = to_dot_labeled(&graph, |node| format!("block<{}>", node.index()));

        assert!(dot.contains("  0 [label=\"block\\<0\\>\"]\n"));
        assert!(dot.contains("  0 -> 1\n"));
        assert!(dot.ends_with('}'));
    }
}
