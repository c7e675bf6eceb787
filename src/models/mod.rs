mod point;
mod node;
mod edge;
mod graph;

pub use point::*;
pub use node::*;
pub use edge::*;
pub use graph::*;

#[cfg(test)]
mod graph_tests;
