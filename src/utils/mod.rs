pub mod graph;

mod disjoint;
mod dot;

pub use disjoint::DisjointSet;
pub use dot::{escape_dot, to_dot, to_dot_labeled};
