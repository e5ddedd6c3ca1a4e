//! epinet - Epidemics on adaptive contact networks.
//!
//! This crate simulates SEIR (and SIRS) contagions spreading over an
//! undirected contact network whose nodes rewire in response to the
//! epidemic: they drop edges to infectious neighbors and close triangles
//! with neighbors-of-neighbors. Many independent trials run in parallel
//! and are scored by how much of the population stays susceptible.
//!
//! # Architecture
//!
//! - `schema`: Configuration types (diseases, behavior, trials, experiments)
//! - `compute`: Network, disease state machines, engine, trial harness
//! - `trace`: Per-step node-state dumps for external visualizers
//! - `input`: Readers for the plain-text input formats
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use epinet::{
//!     compute::{
//!         Compartment, EngineOptions, InfectN, InitialInfectionStrategy, Simulation,
//!         generate, instantiate,
//!     },
//!     schema::{AgentBehavior, DiseaseSpec},
//! };
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let network = generate::ring(1000);
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut disease = instantiate(&DiseaseSpec::default(), network.num_nodes());
//! InfectN::new(5).apply(disease.as_mut(), &mut rng)?;
//!
//! let mut sim = Simulation::new(
//!     network,
//!     vec![disease],
//!     Arc::new(AgentBehavior::new(1, 20, 0.3, 0.001)),
//!     EngineOptions::default(),
//!     rng,
//! )?;
//! sim.run(100)?;
//!
//! let removed = sim.nodes_in_state(Compartment::Removed, 0)?.len();
//! println!("{removed} nodes removed, R0 = {:.2}", sim.basic_reproduction_number(0)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compute;
pub mod input;
pub mod schema;
pub mod trace;

// Re-export commonly used types
pub use compute::trials::{HarnessReport, TrialHarness};
pub use compute::{Compartment, Disease, Network, Simulation};
pub use schema::{AgentBehavior, DiseaseSpec, ExperimentConfig, TrialConfig};
