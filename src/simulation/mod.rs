mod viewport;
mod force_layout;
mod trigger;
mod shared_layout;

pub use viewport::*;
pub use force_layout::*;
pub use trigger::*;
pub use shared_layout::*;

#[cfg(test)]
mod force_layout_tests;
