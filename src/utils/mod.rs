mod constants;
mod errors;
mod layout_config;

pub use constants::*;
pub use errors::*;
pub use layout_config::*;
