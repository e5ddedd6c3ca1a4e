//! Schema module - Configuration types for epidemic experiments.

mod behavior;
mod config;
mod disease;

pub use behavior::*;
pub use config::*;
pub use disease::*;
