mod bounds;
mod barnes_hut;

pub use bounds::*;
pub use barnes_hut::*;
