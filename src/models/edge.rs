use std::fmt;

use crate::models::NodeId;
use crate::utils::{DEFAULT_EDGE_LENGTH, DEFAULT_EDGE_STIFFNESS};

/// Index of an edge inside its [`Graph`](crate::models::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// A spring between two distinct nodes.
///
/// `directed` is only a presentation hint; the spring pulls both ends equally.
#[derive(Debug, Clone)]
pub struct Edge<E = ()> {
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    pub(crate) length: f64,
    pub(crate) stiffness: f64,
    pub directed: bool,
    pub payload: E,
}

impl<E> Edge<E> {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Rest length of the spring.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

/// Spring parameters for [`Graph::add_edge`](crate::models::Graph::add_edge).
///
/// # Example
/// ```
/// use rs_force_layout::models::EdgeOptions;
///
/// let options = EdgeOptions::new(50.0, 500.0).directed();
/// assert_eq!(options.length, 50.0);
/// assert!(options.directed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOptions {
    pub length: f64,
    pub stiffness: f64,
    pub directed: bool,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        EdgeOptions {
            length: DEFAULT_EDGE_LENGTH,
            stiffness: DEFAULT_EDGE_STIFFNESS,
            directed: false,
        }
    }
}

impl EdgeOptions {
    pub fn new(length: f64, stiffness: f64) -> Self {
        EdgeOptions {
            length,
            stiffness,
            directed: false,
        }
    }

    pub fn directed(mut self) -> Self {
        self.directed = true;
        self
    }
}
