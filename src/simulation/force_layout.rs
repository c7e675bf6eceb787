use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::{Edge, EdgeId, Graph, Node, NodeId, Point};
use crate::simulation::ViewTransform;
use crate::spatial::{BarnesHutTree, Body, Bounds};
use crate::utils::{LayoutConfig, LayoutError, MIN_BOUNDS_EXTENT};

/// Whether the engine wants further ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Kinetic energy proxy over the nodes integrated in the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Energy {
    /// Largest squared speed.
    pub max: f64,
    /// Mean squared speed.
    pub mean: f64,
}

/// Summary of one call to [`ForceLayout::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Number of ticks run so far, this one included.
    pub tick: u64,
    pub max_energy: f64,
    pub mean_energy: f64,
    /// Nodes whose velocity and position were updated.
    pub integrated: usize,
    /// Placed nodes without a finite position after the tick.
    pub exploded: usize,
    /// True when this tick moved the engine from Running to Stopped.
    pub stopped: bool,
}

/// Result of [`ForceLayout::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub node: NodeId,
    /// Model-space position of the node.
    pub position: Point,
    /// Model-space distance from the queried point.
    pub distance: f64,
}

/// Force-directed layout over a [`Graph`].
///
/// Each tick pulls edge endpoints towards their rest length, pushes every
/// pair of nodes apart through a [`BarnesHutTree`], and integrates with
/// friction and a speed clamp. Nodes without a position are ignored until
/// something places them; pinned nodes push and pull others but never move.
///
/// # Examples
///
/// ```
/// use rs_force_layout::models::{EdgeOptions, Graph, NodeOptions, Point};
/// use rs_force_layout::simulation::ForceLayout;
/// use rs_force_layout::utils::LayoutConfig;
///
/// let mut graph: Graph = Graph::new();
/// let a = graph.add_node_with("a", (), NodeOptions::at(Point::new(0.0, 0.0))).unwrap();
/// let b = graph.add_node_with("b", (), NodeOptions::at(Point::new(200.0, 0.0))).unwrap();
/// graph.add_edge(a, b, EdgeOptions::new(50.0, 500.0), ()).unwrap();
///
/// let config = LayoutConfig::new(Some(2000.0), Some(0.1), None, None, None).with_seed(1);
/// let mut layout = ForceLayout::with_graph(graph, config).unwrap();
/// layout.run(1_000);
///
/// assert!(!layout.is_running());
/// let graph = layout.graph();
/// let distance = graph.node(a).unwrap().position.distance_to(graph.node(b).unwrap().position);
/// assert!((distance - 50.0).abs() < 1.0);
/// ```
#[derive(Debug)]
pub struct ForceLayout<N = (), E = ()> {
    graph: Graph<N, E>,
    config: LayoutConfig,
    state: RunState,
    energy: Energy,
    bounds: Bounds,
    transform: ViewTransform,
    rng: StdRng,
    ticks: u64,
}

impl<N, E> ForceLayout<N, E> {
    /// Creates a layout over an empty graph.
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        Self::with_graph(Graph::new(), config)
    }

    /// Takes ownership of `graph` and fits the viewport to its placed nodes.
    ///
    /// # Errors
    ///
    /// Whatever [`LayoutConfig::validate`] reports.
    pub fn with_graph(graph: Graph<N, E>, config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let bounds = default_bounds();
        let transform = ViewTransform::new(bounds, config.viewport_width, config.viewport_height)?;
        let mut layout = ForceLayout {
            graph,
            config,
            state: RunState::Stopped,
            energy: Energy::default(),
            bounds,
            transform,
            rng,
            ticks: 0,
        };
        layout.refit();
        Ok(layout)
    }

    pub fn graph(&self) -> &Graph<N, E> {
        &self.graph
    }

    /// Direct access for adding and removing nodes between ticks. Call
    /// [`ForceLayout::refit`] afterwards if the viewport should follow
    /// before the next tick.
    pub fn graph_mut(&mut self) -> &mut Graph<N, E> {
        &mut self.graph
    }

    /// Hands the graph back, dropping the engine state.
    pub fn into_graph(self) -> Graph<N, E> {
        self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replaces the tuning parameters. The viewport follows the new
    /// dimensions; the generator is only reseeded through [`ForceLayout::reseed`].
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<(), LayoutError> {
        config.validate()?;
        self.transform = ViewTransform::new(self.bounds, config.viewport_width, config.viewport_height)?;
        self.config = config;
        Ok(())
    }

    /// Restarts the jitter generator from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Moves to Running. No-op when already running.
    pub fn start(&mut self) {
        if self.state == RunState::Stopped {
            debug!("layout started at tick {}", self.ticks);
            self.state = RunState::Running;
        }
    }

    /// Moves to Stopped. No-op when already stopped.
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            debug!("layout stopped at tick {}", self.ticks);
            self.state = RunState::Stopped;
        }
    }

    pub fn energy(&self) -> Energy {
        self.energy
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Padded bounding box of the placed nodes as of the last refit.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    /// Runs one tick, whatever the current state.
    ///
    /// Numerical failures never abort the tick. A node whose position turns
    /// non-finite is left out of the tree, the springs and the energy metrics,
    /// and keeps its bad position until the caller places it again.
    pub fn advance(&mut self) -> TickReport {
        self.ticks += 1;
        let tick = self.ticks;

        for (_, node) in self.graph.nodes_mut() {
            if !node.pinned {
                node.force = Point::ZERO;
            }
        }

        let Graph { nodes, edges, .. } = &mut self.graph;
        apply_springs(nodes, edges, &mut self.rng);

        self.bounds = layout_bounds(&self.graph, self.config.padding_ratio);
        let bodies: Vec<Body> = self
            .graph
            .nodes()
            .filter(|(_, node)| node.is_active())
            .map(|(id, node)| Body::new(id, node.position, node.mass))
            .collect();
        let tree = BarnesHutTree::build(self.bounds.squared(), self.config.theta, &bodies, &mut self.rng);
        for body in &bodies {
            if let Some(node) = self.graph.node_mut(body.id) {
                if !node.pinned {
                    node.force += tree.apply_forces(body, self.config.repulsion);
                }
            }
        }
        drop(tree);

        let mut integrated = 0;
        let mut exploded = 0;
        let mut total = 0.0;
        let mut max: f64 = 0.0;
        for (id, node) in self.graph.nodes_mut() {
            if !node.is_placed() {
                continue;
            }
            if !node.is_active() {
                trace!("{} ('{}') is still exploded at {}", id, node.label(), node.position);
                node.velocity = Point::ZERO;
                exploded += 1;
                continue;
            }
            if node.pinned {
                continue;
            }
            let (velocity, position) = integrate(node, &self.config);
            if !velocity.is_finite() || !position.is_finite() {
                warn!("{} ('{}') exploded at tick {}, moving to {}", id, node.label(), tick, position);
                node.velocity = Point::ZERO;
                node.position = position;
                exploded += 1;
                continue;
            }
            node.velocity = velocity;
            node.position = position;

            let speed_squared = velocity.magnitude_squared();
            max = max.max(speed_squared);
            total += speed_squared;
            integrated += 1;
        }

        self.energy = Energy {
            max,
            mean: if integrated > 0 { total / integrated as f64 } else { 0.0 },
        };
        self.refit();

        let mut stopped = false;
        if self.config.auto_stop && self.is_running() && self.energy.mean < self.config.min_energy_threshold {
            debug!("mean energy {} below {}, auto-stopping", self.energy.mean, self.config.min_energy_threshold);
            self.state = RunState::Stopped;
            stopped = true;
        }

        trace!(
            "tick {}: {} integrated, {} exploded, energy max {} mean {}",
            tick,
            integrated,
            exploded,
            self.energy.max,
            self.energy.mean
        );
        TickReport {
            tick,
            max_energy: self.energy.max,
            mean_energy: self.energy.mean,
            integrated,
            exploded,
            stopped,
        }
    }

    /// Starts the engine and advances until it stops or `max_ticks` run out.
    /// Returns the number of ticks run.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        self.start();
        let mut ticks = 0;
        while self.is_running() && ticks < max_ticks {
            self.advance();
            ticks += 1;
        }
        ticks
    }

    /// Recomputes the padded bounding box and the viewport transform from
    /// the current positions.
    pub fn refit(&mut self) {
        self.bounds = layout_bounds(&self.graph, self.config.padding_ratio);
        self.transform = self.transform.with_bounds(self.bounds);
    }

    pub fn to_viewport(&self, model: Point) -> Point {
        self.transform.to_viewport(model)
    }

    pub fn to_model(&self, view: Point) -> Point {
        self.transform.to_model(view)
    }

    /// # Errors
    ///
    /// [`LayoutError::InvalidViewport`] for a non-positive or non-finite size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> Result<(), LayoutError> {
        self.transform = ViewTransform::new(self.bounds, width, height)?;
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        Ok(())
    }

    /// Closest placed node to a viewport point, measured in model space.
    ///
    /// # Example
    /// ```
    /// use rs_force_layout::models::{Graph, NodeOptions, Point};
    /// use rs_force_layout::simulation::ForceLayout;
    /// use rs_force_layout::utils::LayoutConfig;
    ///
    /// let mut graph: Graph = Graph::new();
    /// graph.add_node_with("left", (), NodeOptions::at(Point::new(-10.0, 0.0))).unwrap();
    /// let right = graph.add_node_with("right", (), NodeOptions::at(Point::new(10.0, 0.0))).unwrap();
    /// let layout = ForceLayout::with_graph(graph, LayoutConfig::default()).unwrap();
    ///
    /// let click = layout.to_viewport(Point::new(8.0, 1.0));
    /// assert_eq!(layout.nearest(click).unwrap().node, right);
    /// ```
    pub fn nearest(&self, view: Point) -> Option<Nearest> {
        let target = self.to_model(view);
        self.graph
            .nodes()
            .filter(|(_, node)| node.is_active())
            .map(|(id, node)| Nearest {
                node: id,
                position: node.position,
                distance: node.position.distance_to(target),
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Freezes the node where it is and clears its force.
    pub fn pin(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        node.pinned = true;
        node.force = Point::ZERO;
        Ok(())
    }

    pub fn unpin(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.node_mut(id)?.pinned = false;
        Ok(())
    }

    /// Pins the node and moves it to `model`, discarding its velocity.
    pub fn drag_to(&mut self, id: NodeId, model: Point) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        node.pinned = true;
        node.position = model;
        node.velocity = Point::ZERO;
        node.force = Point::ZERO;
        Ok(())
    }

    /// Places a node without pinning it. Also recovers an exploded node.
    pub fn set_position(&mut self, id: NodeId, model: Point) -> Result<(), LayoutError> {
        self.graph.set_position(id, model)
    }

    /// Model positions of every node with a finite position.
    pub fn positions(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.graph
            .nodes()
            .filter(|(_, node)| node.is_active())
            .map(|(id, node)| (id, node.position))
    }

    /// Model-space endpoints of every edge whose ends both have finite positions.
    pub fn edge_segments(&self) -> impl Iterator<Item = (EdgeId, Point, Point)> + '_ {
        self.graph.edges().filter_map(move |(id, edge)| {
            let source = self.graph.node(edge.source())?;
            let target = self.graph.node(edge.target())?;
            (source.is_active() && target.is_active()).then_some((id, source.position, target.position))
        })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<N>, LayoutError> {
        self.graph.node_mut(id).ok_or(LayoutError::UnknownNode(id))
    }
}

/// Hooke's law on every edge whose endpoints both have finite positions.
fn apply_springs<N, E>(nodes: &mut [Option<Node<N>>], edges: &[Option<Edge<E>>], rng: &mut StdRng) {
    for edge in edges.iter().flatten() {
        let (source, target) = (edge.source().index(), edge.target().index());
        let (from, to) = match (&nodes[source], &nodes[target]) {
            (Some(from), Some(to)) if from.is_active() && to.is_active() => (from.position, to.position),
            _ => continue,
        };

        let delta = to - from;
        let length = delta.magnitude();
        let direction = if length > 0.0 {
            delta / length
        } else {
            Point::random_unit(rng)
        };
        let pull = direction * (edge.stiffness() * (length - edge.length()));

        // Pinned endpoints are not integrated and keep their force as is.
        if let Some(node) = nodes[source].as_mut().filter(|node| !node.pinned) {
            node.force += pull;
        }
        if let Some(node) = nodes[target].as_mut().filter(|node| !node.pinned) {
            node.force -= pull;
        }
    }
}

/// Semi-implicit Euler step with friction and a speed clamp. Returns the
/// new velocity and position without storing them.
fn integrate<N>(node: &Node<N>, config: &LayoutConfig) -> (Point, Point) {
    let acceleration = node.force / node.mass();
    let mut velocity = (node.velocity + acceleration * config.timestep) * config.friction;
    let speed = velocity.magnitude();
    if speed > config.max_speed {
        velocity = velocity * (config.max_speed / speed);
    }
    (velocity, node.position + velocity * config.timestep)
}

fn default_bounds() -> Bounds {
    Bounds::around(Point::ZERO, MIN_BOUNDS_EXTENT, MIN_BOUNDS_EXTENT)
}

fn layout_bounds<N, E>(graph: &Graph<N, E>, padding_ratio: f64) -> Bounds {
    Bounds::from_points(graph.nodes().map(|(_, node)| node.position))
        .map(|bounds| bounds.with_min_extent(MIN_BOUNDS_EXTENT).padded(padding_ratio))
        .unwrap_or_else(default_bounds)
}
