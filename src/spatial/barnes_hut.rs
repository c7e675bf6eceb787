use std::collections::VecDeque;

use log::trace;
use rand::Rng;

use crate::models::{NodeId, Point};
use crate::spatial::Bounds;
use crate::utils::{JITTER_RATIO, MAX_TREE_DEPTH, MIN_REPULSION_DISTANCE};

const ROOT: usize = 0;

/// A point mass handed to the tree.
///
/// The tree keeps its own copy, so jitter applied during insertion never
/// touches the caller's node.
///
/// # Examples
///
/// ```
/// use rs_force_layout::models::{NodeId, Point};
/// use rs_force_layout::spatial::Body;
///
/// let body = Body::new(NodeId(0), Point::new(1.0, 2.0), 3.0);
/// assert_eq!(body.mass, 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: NodeId,
    pub position: Point,
    pub mass: f64,
}

impl Body {
    pub fn new(id: NodeId, position: Point, mass: f64) -> Self {
        Body { id, position, mass }
    }
}

/// Quadrants of a branch. Model space grows right and down, so "north" is
/// the half with the smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthEast = 2,
    SouthWest = 3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Empty,
    Leaf(usize),
    Branch(usize),
}

/// One square (or rectangular) region of the tree with aggregated mass data.
#[derive(Debug, Clone)]
pub struct Branch {
    origin: Point,
    size: Point,
    slots: [Slot; 4],
    mass: f64,
    /// Sum of `mass * position` over every body below this branch.
    moment: Point,
    /// Bodies that could not be separated before the depth limit.
    overflow: Vec<usize>,
}

impl Branch {
    fn new(origin: Point, size: Point) -> Self {
        Branch {
            origin,
            size,
            slots: [Slot::Empty; 4],
            mass: 0.0,
            moment: Point::ZERO,
            overflow: Vec::new(),
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn center(&self) -> Point {
        self.origin + self.size / 2.0
    }

    /// Mass-weighted centre of everything below this branch.
    pub fn centroid(&self) -> Point {
        if self.mass > 0.0 {
            self.moment / self.mass
        } else {
            self.center()
        }
    }

    /// Geometric mean of width and height; the `h` of the opening criterion.
    pub fn extent(&self) -> f64 {
        (self.size.x * self.size.y).sqrt()
    }

    pub fn contains(&self, p: Point) -> bool {
        Bounds::new(self.origin, self.origin + self.size).contains(p)
    }

    pub fn quadrant_of(&self, p: Point) -> Quadrant {
        let center = self.center();
        match (p.x >= center.x, p.y >= center.y) {
            (true, false) => Quadrant::NorthEast,
            (false, false) => Quadrant::NorthWest,
            (true, true) => Quadrant::SouthEast,
            (false, true) => Quadrant::SouthWest,
        }
    }

    /// Origin and size of the given quadrant.
    fn quadrant_region(&self, quadrant: Quadrant) -> (Point, Point) {
        let half = self.size / 2.0;
        let origin = match quadrant {
            Quadrant::NorthWest => self.origin,
            Quadrant::NorthEast => Point::new(self.origin.x + half.x, self.origin.y),
            Quadrant::SouthWest => Point::new(self.origin.x, self.origin.y + half.y),
            Quadrant::SouthEast => self.origin + half,
        };
        (origin, half)
    }

    fn accumulate(&mut self, position: Point, mass: f64) {
        self.mass += mass;
        self.moment += position * mass;
    }
}

/// Barnes-Hut quadtree over a snapshot of body positions.
///
/// The tree is rebuilt from scratch every simulation tick. Branches live in
/// an index arena and leaves refer to bodies by index, so nothing is
/// reference-counted and dropping the tree frees everything at once.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rs_force_layout::models::{NodeId, Point};
/// use rs_force_layout::spatial::{BarnesHutTree, Body, Bounds};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let bodies = [
///     Body::new(NodeId(0), Point::new(-5.0, 0.0), 1.0),
///     Body::new(NodeId(1), Point::new(5.0, 0.0), 1.0),
/// ];
/// let bounds = Bounds::new(Point::new(-10.0, -10.0), Point::new(10.0, 10.0));
/// let tree = BarnesHutTree::build(bounds, 0.5, &bodies, &mut rng);
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.total_mass(), 2.0);
///
/// // The left body is pushed further left by the right one.
/// let force = tree.apply_forces(&bodies[0], 100.0);
/// assert!(force.x < 0.0);
/// assert!((force.x + 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BarnesHutTree {
    branches: Vec<Branch>,
    bodies: Vec<Body>,
    theta: f64,
    skipped: usize,
}

impl BarnesHutTree {
    /// Creates an empty tree whose root covers `bounds`.
    pub fn new(bounds: Bounds, theta: f64) -> Self {
        BarnesHutTree {
            branches: vec![Branch::new(bounds.top_left, bounds.size())],
            bodies: Vec::new(),
            theta,
            skipped: 0,
        }
    }

    /// Creates a tree and inserts every body in order.
    pub fn build<R: Rng>(bounds: Bounds, theta: f64, bodies: &[Body], rng: &mut R) -> Self {
        let mut tree = Self::new(bounds, theta);
        for body in bodies {
            tree.insert(*body, rng);
        }
        tree
    }

    /// Inserts one body, descending without recursion.
    ///
    /// Every branch on the way down absorbs the body's mass. When a leaf is
    /// hit, it is split into a sub-branch that receives both bodies. If both
    /// sit on exactly the same point, the existing occupant is nudged by a
    /// small random offset drawn from `rng` so the split can make progress.
    ///
    /// Bodies with a non-finite position or mass are skipped and `false` is
    /// returned.
    pub fn insert<R: Rng>(&mut self, body: Body, rng: &mut R) -> bool {
        if !body.position.is_finite() || !(body.mass.is_finite() && body.mass > 0.0) {
            trace!("skipping {} at {} with mass {}", body.id, body.position, body.mass);
            self.skipped += 1;
            return false;
        }

        let index = self.bodies.len();
        self.bodies.push(body);

        let mut path: Vec<usize> = Vec::new();
        let mut current = ROOT;
        loop {
            path.push(current);
            self.branches[current].accumulate(body.position, body.mass);

            if path.len() > MAX_TREE_DEPTH {
                trace!("{} reached the depth limit, keeping it in overflow", body.id);
                self.branches[current].overflow.push(index);
                return true;
            }

            let quadrant = self.branches[current].quadrant_of(body.position);
            match self.branches[current].slots[quadrant as usize] {
                Slot::Empty => {
                    self.branches[current].slots[quadrant as usize] = Slot::Leaf(index);
                    return true;
                }
                Slot::Branch(child) => current = child,
                Slot::Leaf(occupant) => {
                    let (origin, size) = self.branches[current].quadrant_region(quadrant);
                    let mut sub = Branch::new(origin, size);

                    if self.bodies[occupant].position == body.position {
                        let displaced = jitter(body.position, &sub, rng);
                        let shift = (displaced - body.position) * self.bodies[occupant].mass;
                        for &ancestor in &path {
                            self.branches[ancestor].moment += shift;
                        }
                        self.bodies[occupant].position = displaced;
                    }

                    let resident = self.bodies[occupant];
                    sub.accumulate(resident.position, resident.mass);
                    let resident_quadrant = sub.quadrant_of(resident.position);
                    sub.slots[resident_quadrant as usize] = Slot::Leaf(occupant);

                    let child = self.branches.len();
                    self.branches.push(sub);
                    self.branches[current].slots[quadrant as usize] = Slot::Branch(child);
                    current = child;
                }
            }
        }
    }

    /// Repulsive force felt by `body` from everything in the tree.
    ///
    /// The walk is breadth-first over an explicit queue. A branch is opened
    /// when `extent / distance > theta` or when it contains `body` itself;
    /// otherwise its aggregate mass acts from its centroid. Each contribution
    /// has magnitude `repulsion * mass / distance²`, with distances below
    /// [`MIN_REPULSION_DISTANCE`] clamped up to it.
    pub fn apply_forces(&self, body: &Body, repulsion: f64) -> Point {
        let mut force = Point::ZERO;
        if !body.position.is_finite() {
            return force;
        }

        let mut queue: VecDeque<Slot> = VecDeque::new();
        queue.push_back(Slot::Branch(ROOT));

        while let Some(element) = queue.pop_front() {
            match element {
                Slot::Empty => {}
                Slot::Leaf(index) => {
                    let other = &self.bodies[index];
                    if other.id == body.id {
                        continue;
                    }
                    force += repel(body.position, other.position, other.mass, repulsion);
                }
                Slot::Branch(index) => {
                    let branch = &self.branches[index];
                    if branch.mass <= 0.0 {
                        continue;
                    }
                    let centroid = branch.centroid();
                    let distance = centroid.distance_to(body.position);
                    let too_close = distance == 0.0
                        || branch.contains(body.position)
                        || branch.extent() / distance > self.theta;
                    if too_close {
                        queue.extend(branch.slots.iter().copied().filter(|slot| *slot != Slot::Empty));
                        queue.extend(branch.overflow.iter().map(|&i| Slot::Leaf(i)));
                    } else {
                        force += repel(body.position, centroid, branch.mass, repulsion);
                    }
                }
            }
        }
        force
    }

    /// Exact pairwise repulsion on `body` from every other body, using the
    /// same force law as [`BarnesHutTree::apply_forces`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_force_layout::models::{NodeId, Point};
    /// use rs_force_layout::spatial::{BarnesHutTree, Body};
    ///
    /// let bodies = [
    ///     Body::new(NodeId(0), Point::new(0.0, 0.0), 1.0),
    ///     Body::new(NodeId(1), Point::new(0.0, 2.0), 2.0),
    /// ];
    /// let force = BarnesHutTree::brute_force(&bodies, &bodies[0], 8.0);
    /// assert_eq!(force, Point::new(0.0, -4.0));
    /// ```
    pub fn brute_force(bodies: &[Body], body: &Body, repulsion: f64) -> Point {
        bodies
            .iter()
            .filter(|other| other.id != body.id && other.position.is_finite())
            .fold(Point::ZERO, |acc, other| acc + repel(body.position, other.position, other.mass, repulsion))
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Number of bodies held by the tree.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies rejected for a non-finite position or mass.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Bodies as stored, including any jitter applied during insertion.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn root(&self) -> &Branch {
        &self.branches[ROOT]
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn total_mass(&self) -> f64 {
        self.root().mass
    }

    pub fn centroid(&self) -> Point {
        self.root().centroid()
    }

    /// Number of branch levels, the root counting as one.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut queue = VecDeque::from([(ROOT, 1)]);
        while let Some((index, level)) = queue.pop_front() {
            deepest = deepest.max(level);
            for slot in &self.branches[index].slots {
                if let Slot::Branch(child) = slot {
                    queue.push_back((*child, level + 1));
                }
            }
        }
        deepest
    }

    /// Sum of the masses of every body stored under `branch`, found by
    /// walking the tree rather than reading the aggregate.
    pub(crate) fn contained_mass(&self, branch: usize) -> f64 {
        let mut total = 0.0;
        let mut queue = VecDeque::from([branch]);
        while let Some(index) = queue.pop_front() {
            let current = &self.branches[index];
            total += current.overflow.iter().map(|&i| self.bodies[i].mass).sum::<f64>();
            for slot in &current.slots {
                match slot {
                    Slot::Empty => {}
                    Slot::Leaf(i) => total += self.bodies[*i].mass,
                    Slot::Branch(child) => queue.push_back(*child),
                }
            }
        }
        total
    }

    pub(crate) fn branches(&self) -> &[Branch] {
        &self.branches
    }
}

/// Force on a body at `at` from a mass at `from`, pointing away from `from`.
fn repel(at: Point, from: Point, mass: f64, repulsion: f64) -> Point {
    let displacement = at - from;
    let distance = displacement.magnitude();
    if distance == 0.0 {
        return Point::ZERO;
    }
    let clamped = distance.max(MIN_REPULSION_DISTANCE);
    displacement / distance * (repulsion * mass / (clamped * clamped))
}

/// Moves `position` by up to `JITTER_RATIO` of the branch half extent on each
/// axis, staying inside the branch.
fn jitter<R: Rng>(position: Point, branch: &Branch, rng: &mut R) -> Point {
    let half = branch.size / 2.0;
    let dx = rng.random_range(-JITTER_RATIO..=JITTER_RATIO) * half.x;
    let dy = rng.random_range(-JITTER_RATIO..=JITTER_RATIO) * half.y;
    let far = branch.origin + branch.size;
    Point::new(
        (position.x + dx).clamp(branch.origin.x, far.x),
        (position.y + dy).clamp(branch.origin.y, far.y),
    )
}
