use std::fmt;

use crate::models::Point;
use crate::utils::DEFAULT_NODE_MASS;

/// Index of a node inside its [`Graph`](crate::models::Graph).
///
/// Ids are slot indices; removing other nodes never invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// A body in the layout: a labelled point mass with a caller-owned payload.
///
/// Positions start as [`Point::NULL`]; the engine leaves such nodes alone until
/// something places them.
#[derive(Debug, Clone)]
pub struct Node<N = ()> {
    pub(crate) label: String,
    pub(crate) mass: f64,
    pub pinned: bool,
    pub position: Point,
    pub velocity: Point,
    pub force: Point,
    pub payload: N,
}

impl<N> Node<N> {
    pub(crate) fn new(label: String, mass: f64, payload: N) -> Self {
        Node {
            label,
            mass,
            pinned: false,
            position: Point::NULL,
            velocity: Point::ZERO,
            force: Point::ZERO,
            payload,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Always positive; enforced by [`Graph::set_mass`](crate::models::Graph::set_mass).
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// True once the node has a position, valid or not.
    pub fn is_placed(&self) -> bool {
        !self.position.is_null()
    }

    /// True when the node has a usable position this tick.
    pub fn is_active(&self) -> bool {
        self.position.is_finite()
    }
}

/// Optional settings for [`Graph::add_node_with`](crate::models::Graph::add_node_with).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeOptions {
    pub mass: f64,
    pub position: Option<Point>,
    pub pinned: bool,
}

impl Default for NodeOptions {
    fn default() -> Self {
        NodeOptions {
            mass: DEFAULT_NODE_MASS,
            position: None,
            pinned: false,
        }
    }
}

impl NodeOptions {
    pub fn at(position: Point) -> Self {
        NodeOptions {
            position: Some(position),
            ..NodeOptions::default()
        }
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}
