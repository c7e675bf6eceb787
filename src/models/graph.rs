use std::collections::HashMap;

use log::{debug, warn};

use crate::models::{Edge, EdgeId, EdgeOptions, Node, NodeId, NodeOptions, Point};
use crate::utils::LayoutError;

/// Index-addressed store of nodes and edges.
///
/// Nodes and edges live in slot vectors and are addressed by [`NodeId`] and
/// [`EdgeId`]. Removing an entity frees its slot without shifting the others,
/// so outstanding ids stay valid. Labels are unique.
///
/// # Example
/// ```
/// use rs_force_layout::models::{EdgeOptions, Graph};
///
/// let mut graph: Graph = Graph::new();
/// let a = graph.add_node("a", ()).unwrap();
/// let b = graph.add_node("b", ()).unwrap();
/// graph.add_edge(a, b, EdgeOptions::default(), ()).unwrap();
///
/// graph.remove_node(a);
/// assert_eq!(graph.node_count(), 1);
/// assert_eq!(graph.edge_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Graph<N = (), E = ()> {
    pub(crate) nodes: Vec<Option<Node<N>>>,
    pub(crate) edges: Vec<Option<Edge<E>>>,
    labels: HashMap<String, NodeId>,
    node_count: usize,
    edge_count: usize,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Graph {
            nodes: Vec::new(),
            edges: Vec::new(),
            labels: HashMap::new(),
            node_count: 0,
            edge_count: 0,
        }
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unplaced node with unit mass.
    pub fn add_node(&mut self, label: impl Into<String>, payload: N) -> Result<NodeId, LayoutError> {
        self.add_node_with(label, payload, NodeOptions::default())
    }

    /// Adds a node with an explicit mass, starting position and pin state.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateLabel`] if the label is taken and
    /// [`LayoutError::InvalidMass`] if the mass is not a positive finite number.
    ///
    /// # Example
    /// ```
    /// use rs_force_layout::models::{Graph, NodeOptions, Point};
    ///
    /// let mut graph: Graph = Graph::new();
    /// let hub = graph
    ///     .add_node_with("hub", (), NodeOptions::at(Point::new(10.0, 0.0)).with_mass(3.0))
    ///     .unwrap();
    /// assert_eq!(graph.node(hub).unwrap().mass(), 3.0);
    /// assert!(graph.add_node("hub", ()).is_err());
    /// ```
    pub fn add_node_with(
        &mut self,
        label: impl Into<String>,
        payload: N,
        options: NodeOptions,
    ) -> Result<NodeId, LayoutError> {
        let label = label.into();
        if self.labels.contains_key(&label) {
            return Err(LayoutError::DuplicateLabel(label));
        }
        validate_mass(options.mass)?;

        let id = NodeId(self.nodes.len());
        let mut node = Node::new(label.clone(), options.mass, payload);
        node.pinned = options.pinned;
        if let Some(position) = options.position {
            node.position = position;
        }
        self.nodes.push(Some(node));
        self.labels.insert(label, id);
        self.node_count += 1;
        Ok(id)
    }

    /// Removes a node together with every edge that references it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node<N>> {
        let node = match self.nodes.get_mut(id.index()).and_then(Option::take) {
            Some(node) => node,
            None => {
                warn!("{} does not exist, no node removed.", id);
                return None;
            }
        };
        self.labels.remove(&node.label);
        self.node_count -= 1;

        let mut dropped = 0;
        for slot in self.edges.iter_mut() {
            if slot.as_ref().is_some_and(|edge| edge.touches(id)) {
                *slot = None;
                dropped += 1;
            }
        }
        self.edge_count -= dropped;
        debug!("removed {} ('{}') and {} attached edges", id, node.label, dropped);
        Some(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<N>> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<N>> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn id_of(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    pub fn node_by_label(&self, label: &str) -> Option<&Node<N>> {
        self.id_of(label).and_then(|id| self.node(id))
    }

    pub fn set_mass(&mut self, id: NodeId, mass: f64) -> Result<(), LayoutError> {
        validate_mass(mass)?;
        let node = self.node_mut(id).ok_or(LayoutError::UnknownNode(id))?;
        node.mass = mass;
        Ok(())
    }

    /// Places a node and clears its velocity. This is also how a caller
    /// recovers a node whose position exploded.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), LayoutError> {
        let node = self.node_mut(id).ok_or(LayoutError::UnknownNode(id))?;
        node.position = position;
        node.velocity = Point::ZERO;
        Ok(())
    }

    /// Connects two distinct, existing nodes with a spring.
    ///
    /// # Errors
    ///
    /// * [`LayoutError::InvalidEdge`] when an endpoint is missing or both
    ///   endpoints are the same node.
    /// * [`LayoutError::InvalidLength`] / [`LayoutError::InvalidStiffness`] for
    ///   bad spring parameters.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        options: EdgeOptions,
        payload: E,
    ) -> Result<EdgeId, LayoutError> {
        if self.node(source).is_none() {
            return Err(LayoutError::InvalidEdge(format!("source {} does not exist", source)));
        }
        if self.node(target).is_none() {
            return Err(LayoutError::InvalidEdge(format!("target {} does not exist", target)));
        }
        if source == target {
            return Err(LayoutError::InvalidEdge(format!("{} cannot be linked to itself", source)));
        }
        validate_spring(options.length, options.stiffness)?;

        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge {
            source,
            target,
            length: options.length,
            stiffness: options.stiffness,
            directed: options.directed,
            payload,
        }));
        self.edge_count += 1;
        Ok(id)
    }

    /// Same as [`Graph::add_edge`], addressing the endpoints by label.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        options: EdgeOptions,
        payload: E,
    ) -> Result<EdgeId, LayoutError> {
        let source_id = self
            .id_of(source)
            .ok_or_else(|| LayoutError::InvalidEdge(format!("no node labelled '{}'", source)))?;
        let target_id = self
            .id_of(target)
            .ok_or_else(|| LayoutError::InvalidEdge(format!("no node labelled '{}'", target)))?;
        self.add_edge(source_id, target_id, options, payload)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge<E>> {
        let edge = self.edges.get_mut(id.index()).and_then(Option::take);
        match edge {
            Some(_) => self.edge_count -= 1,
            None => warn!("{} does not exist, no edge removed.", id),
        }
        edge
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge<E>> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge<E>> {
        self.edges.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Changes the rest length and stiffness of an existing edge.
    pub fn set_spring(&mut self, id: EdgeId, length: f64, stiffness: f64) -> Result<(), LayoutError> {
        validate_spring(length, stiffness)?;
        let edge = self.edge_mut(id).ok_or(LayoutError::UnknownEdge(id))?;
        edge.length = length;
        edge.stiffness = stiffness;
        Ok(())
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<N>)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|node| (NodeId(index), node)))
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node<N>)> {
        self.nodes
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|node| (NodeId(index), node)))
    }

    /// Live edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge<E>)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|edge| (EdgeId(index), edge)))
    }

    /// Edges with `node` at either end.
    pub fn edges_of(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge<E>)> {
        self.edges().filter(move |(_, edge)| edge.touches(node))
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.labels.clear();
        self.node_count = 0;
        self.edge_count = 0;
    }
}

fn validate_mass(mass: f64) -> Result<(), LayoutError> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidMass)
    }
}

fn validate_spring(length: f64, stiffness: f64) -> Result<(), LayoutError> {
    if !length.is_finite() || length <= 0.0 {
        return Err(LayoutError::InvalidLength);
    }
    if !stiffness.is_finite() || stiffness < 0.0 {
        return Err(LayoutError::InvalidStiffness);
    }
    Ok(())
}
