use std::error::Error;
use std::fmt;

use crate::models::{EdgeId, NodeId};

/// Represents errors surfaced synchronously by the layout engine.
///
/// Numerical trouble inside a tick never shows up here; the engine recovers
/// from it and logs instead. Only construction-time violations and
/// collaborator failures are reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Indicates a non-positive or non-finite node mass.
    InvalidMass,
    /// Indicates an edge whose endpoints are missing or identical.
    InvalidEdge(String),
    /// Indicates a non-positive or non-finite edge rest length.
    InvalidLength,
    /// Indicates a negative or non-finite edge stiffness.
    InvalidStiffness,
    /// The node id does not refer to a live node.
    UnknownNode(NodeId),
    /// The edge id does not refer to a live edge.
    UnknownEdge(EdgeId),
    /// Another node already uses this label.
    DuplicateLabel(String),
    /// Indicates a viewport with a non-positive or non-finite dimension.
    InvalidViewport,
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// The periodic trigger failed to register or deregister.
    Trigger(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LayoutError::InvalidMass => write!(f, "Invalid mass value"),
            LayoutError::InvalidEdge(msg) => write!(f, "Invalid edge: {}", msg),
            LayoutError::InvalidLength => write!(f, "Invalid edge length"),
            LayoutError::InvalidStiffness => write!(f, "Invalid edge stiffness"),
            LayoutError::UnknownNode(id) => write!(f, "Unknown node {}", id),
            LayoutError::UnknownEdge(id) => write!(f, "Unknown edge {}", id),
            LayoutError::DuplicateLabel(label) => write!(f, "Duplicate node label '{}'", label),
            LayoutError::InvalidViewport => write!(f, "Invalid viewport size"),
            LayoutError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            LayoutError::Trigger(msg) => write!(f, "Periodic trigger error: {}", msg),
        }
    }
}

impl Error for LayoutError {}
