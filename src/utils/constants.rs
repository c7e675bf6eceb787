use crate::utils::LayoutConfig;

/// Rest length given to edges when the caller does not choose one.
pub const DEFAULT_EDGE_LENGTH: f64 = 1.0;
/// Spring stiffness given to edges when the caller does not choose one.
pub const DEFAULT_EDGE_STIFFNESS: f64 = 400.0;
pub const DEFAULT_NODE_MASS: f64 = 1.0;

/// Repulsion distances are clamped to at least this value.
pub const MIN_REPULSION_DISTANCE: f64 = 1.0;
/// Upper bound on jitter, as a fraction of the sub-branch half extent.
pub const JITTER_RATIO: f64 = 0.04;
/// Deeper than this, colliding bodies go to the branch overflow list.
pub const MAX_TREE_DEPTH: usize = 128;
/// Smallest width or height a layout bounding box is allowed to have.
pub const MIN_BOUNDS_EXTENT: f64 = 4.0;

pub const DEFAULT_LAYOUT_CONFIG: LayoutConfig = LayoutConfig {
    repulsion: 400.0,
    friction: 0.5,
    timestep: 0.03,
    max_speed: 1000.0,
    theta: 0.5,
    min_energy_threshold: 0.01,
    auto_stop: true,
    padding_ratio: 0.07,
    viewport_width: 800.0,
    viewport_height: 600.0,
    seed: None,
};
