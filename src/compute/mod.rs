//! Compute module - Network epidemics and trial evaluation.

mod compartment;
mod disease;
mod engine;
mod network;
mod observer;
mod rewiring;
mod seeding;

pub mod generate;
pub mod trials;

pub use compartment::*;
pub use disease::*;
pub use engine::*;
pub use network::*;
pub use observer::*;
pub use rewiring::{RewirePlan, RewireSummary};
pub use seeding::*;
