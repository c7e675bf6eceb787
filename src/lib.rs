//! Force-directed graph layout.
//!
//! Nodes connected by springs settle into a 2-D arrangement under mutual
//! inverse-square repulsion. Repulsion is approximated with a Barnes-Hut
//! quadtree rebuilt every tick; integration applies friction and a speed
//! clamp, and the engine stops itself once the layout stops moving.
//!
//! - [`models`]: the [`Point`](models::Point) vector type and the node/edge arena.
//! - [`spatial`]: bounding boxes and the Barnes-Hut tree.
//! - [`simulation`]: the engine, viewport transforms and the shared,
//!   timer-driven wrapper.
//! - [`utils`]: configuration, constants and errors.
pub mod utils;
pub mod models;
pub mod spatial;
pub mod simulation;
