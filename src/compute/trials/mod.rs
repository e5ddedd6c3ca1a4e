//! Trial batches and fitness evaluation.
//!
//! A [`TrialHarness`] runs many independent [`Simulation`](crate::compute::Simulation)s
//! of one setup over a rayon pool and aggregates them into a
//! [`HarnessReport`]: the mean final susceptible fraction ("fitness"), the
//! mean final R0 and the R0-over-time series.
//!
//! # Example
//!
//! ```rust,no_run
//! use epinet::compute::generate;
//! use epinet::compute::trials::TrialHarness;
//! use epinet::schema::{AgentBehavior, DiseaseSpec, TrialConfig};
//!
//! let harness = TrialHarness::from_specs(
//!     generate::ring(1000),
//!     &[DiseaseSpec::default()],
//!     AgentBehavior::new(1, 20, 0.3, 0.001),
//!     TrialConfig::default(),
//! )?;
//! let report = harness.run()?;
//! println!("fitness {:.3}, R0 {:.3}", report.fitness, report.mean_nonzero_r0);
//! # Ok::<(), epinet::compute::trials::HarnessError>(())
//! ```

mod genotype;
mod harness;
mod outcome;

pub use genotype::{FitnessCalculator, RankedGenotype, rank_genotypes};
pub use harness::{Contagion, HarnessError, TrialHarness};
pub use outcome::{HarnessReport, TrialOutcome, mean_nonzero, mean_series};
