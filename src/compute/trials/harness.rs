//! Parallel trial harness.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use super::{HarnessReport, TrialOutcome};
use crate::compute::{
    CompartmentHistory, Disease, DiseaseError, EngineOptions, InfectN, InitialInfectionStrategy,
    Network, R0Tracker, Simulation, SimulationError, StepObserver, instantiate,
};
use crate::schema::{AgentBehavior, ConfigError, DiseaseSpec, StopRule, TrialConfig};
use crate::trace::StateRecorder;

/// Trial harness errors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Disease(#[from] DiseaseError),
    #[error("Trial run was cancelled")]
    Cancelled,
    #[error("Trial {trial} exceeded its deadline")]
    DeadlineExceeded { trial: usize },
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to write trace: {0}")]
    Io(#[from] std::io::Error),
}

/// An unseeded disease template and the strategy that seeds each copy.
#[derive(Debug, Clone)]
pub struct Contagion {
    pub template: Box<dyn Disease>,
    pub seeding: Arc<dyn InitialInfectionStrategy>,
}

impl Contagion {
    /// Template sized to `num_nodes`, seeded with the spec's
    /// `initial_infected` count.
    pub fn from_spec(spec: &DiseaseSpec, num_nodes: usize) -> Self {
        Self {
            template: instantiate(spec, num_nodes),
            seeding: Arc::new(InfectN::new(spec.initial_infected())),
        }
    }
}

/// Runs independent trials of one network/contagion/behavior setup.
///
/// Every trial works on its own clone of the network and the disease
/// templates and owns its random source; only the behavior is shared.
#[derive(Debug)]
pub struct TrialHarness {
    network: Network,
    contagions: Vec<Contagion>,
    behavior: Arc<AgentBehavior>,
    config: TrialConfig,
    cancelled: Arc<AtomicBool>,
}

impl TrialHarness {
    /// Validate the setup and build a harness. Fails before any trial runs.
    pub fn new(
        network: Network,
        contagions: Vec<Contagion>,
        behavior: AgentBehavior,
        config: TrialConfig,
    ) -> Result<Self, HarnessError> {
        config.validate()?;
        behavior.validate()?;
        if contagions.is_empty() {
            return Err(ConfigError::NoDiseases.into());
        }

        let num_nodes = network.num_nodes();
        for (index, contagion) in contagions.iter().enumerate() {
            let disease_nodes = contagion.template.num_nodes();
            if disease_nodes != num_nodes {
                return Err(SimulationError::NodeCountMismatch {
                    index,
                    disease_nodes,
                    network_nodes: num_nodes,
                }
                .into());
            }
            let requested = contagion.seeding.initial_infections();
            if requested > num_nodes {
                return Err(DiseaseError::TooManyInitialInfections {
                    requested,
                    num_nodes,
                }
                .into());
            }
        }

        Ok(Self {
            network,
            contagions,
            behavior: Arc::new(behavior),
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Build a harness from disease specs.
    pub fn from_specs(
        network: Network,
        specs: &[DiseaseSpec],
        behavior: AgentBehavior,
        config: TrialConfig,
    ) -> Result<Self, HarnessError> {
        for spec in specs {
            spec.validate()?;
        }
        let contagions = specs
            .iter()
            .map(|spec| Contagion::from_spec(spec, network.num_nodes()))
            .collect();
        Self::new(network, contagions, behavior, config)
    }

    /// Same setup with a different behavior. Shares the cancel handle.
    pub fn with_behavior(&self, behavior: AgentBehavior) -> Result<Self, HarnessError> {
        behavior.validate()?;
        Ok(Self {
            network: self.network.clone(),
            contagions: self.contagions.clone(),
            behavior: Arc::new(behavior),
            config: self.config.clone(),
            cancelled: Arc::clone(&self.cancelled),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn behavior(&self) -> &AgentBehavior {
        &self.behavior
    }

    fn trial_rng(&self, trial: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(trial as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Clone the templates, seed them, and wrap everything in a simulation.
    pub fn build_trial(&self, trial: usize) -> Result<Simulation, HarnessError> {
        let mut rng = self.trial_rng(trial);
        let mut diseases = Vec::with_capacity(self.contagions.len());
        for contagion in &self.contagions {
            let mut disease = contagion.template.clone();
            contagion.seeding.apply(disease.as_mut(), &mut rng)?;
            diseases.push(disease);
        }

        let options = EngineOptions {
            dynamic: self.config.dynamic,
            degree_policy: self.config.degree_policy,
        };
        Ok(Simulation::new(
            self.network.clone(),
            diseases,
            Arc::clone(&self.behavior),
            options,
            rng,
        )?)
    }

    /// Run a single trial under the configured stop rule.
    pub fn run_trial(&self, trial: usize) -> Result<TrialOutcome, HarnessError> {
        let start = Instant::now();
        let deadline = self
            .config
            .deadline_ms
            .map(|ms| start + Duration::from_millis(ms));
        let mut sim = self.build_trial(trial)?;
        let mut tracker = R0Tracker::new(0);
        let limit = self.config.stop.step_limit();

        loop {
            if self.config.stop.stops_on_quiescence() && sim.is_quiescent() {
                break;
            }
            if limit.is_some_and(|max| sim.current_step() >= max) {
                break;
            }
            if self.cancelled.load(Ordering::Relaxed) {
                return Err(HarnessError::Cancelled);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(HarnessError::DeadlineExceeded { trial });
            }

            if self.config.track_r0 {
                sim.step_observed(&mut [&mut tracker as &mut dyn StepObserver])?;
            } else {
                sim.step()?;
            }
        }

        let counts = sim.counts(0)?;
        let outcome = TrialOutcome {
            trial,
            fitness: counts.susceptible_fraction(),
            r0: sim.basic_reproduction_number(0)?,
            steps: sim.current_step(),
            counts,
            r0_series: tracker.into_series(),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        };
        debug!(
            "Trial {} finished after {} steps: {} (fitness {:.4}, R0 {:.3})",
            trial, outcome.steps, outcome.counts, outcome.fitness, outcome.r0
        );
        Ok(outcome)
    }

    /// Run every trial in parallel and aggregate the outcomes.
    pub fn run(&self) -> Result<HarnessReport, HarnessError> {
        let start = Instant::now();
        info!(
            "Running {} trials on {} nodes / {} edges",
            self.config.trials,
            self.network.num_nodes(),
            self.network.num_edges()
        );

        let run_all = || {
            (0..self.config.trials)
                .into_par_iter()
                .map(|trial| self.run_trial(trial))
                .collect::<Result<Vec<_>, _>>()
        };
        let outcomes = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(run_all)?,
            None => run_all()?,
        };

        let elapsed = start.elapsed().as_secs_f64();
        let report = HarnessReport::aggregate(outcomes, elapsed);
        info!(
            "{} trials done in {:.2}s: fitness {:.4}, mean R0 {:.3}",
            report.trials.len(),
            elapsed,
            report.fitness,
            report.mean_r0
        );
        Ok(report)
    }

    /// Mean final susceptible fraction over all trials.
    pub fn mean_fitness(&self) -> Result<f32, HarnessError> {
        Ok(self.run()?.fitness)
    }

    /// Run trial 0 until quiescence, writing a state block for the initial
    /// state and after every step, then the end marker.
    ///
    /// A `Quiescence` stop rule's `max_steps` caps the run; fixed-step
    /// settings are ignored.
    pub fn run_traced<W: Write>(&self, writer: W) -> Result<TrialOutcome, HarnessError> {
        let start = Instant::now();
        let mut sim = self.build_trial(0)?;
        let mut recorder = StateRecorder::new(writer);
        let mut tracker = R0Tracker::new(0);
        let mut history = CompartmentHistory::new(0);
        let cap = match self.config.stop {
            StopRule::Quiescence { max_steps } => max_steps,
            StopRule::FixedSteps { .. } => None,
        };

        recorder.record(sim.node_states(0)?)?;
        while !sim.is_quiescent() {
            if cap.is_some_and(|max| sim.current_step() >= max) {
                break;
            }
            if self.cancelled.load(Ordering::Relaxed) {
                return Err(HarnessError::Cancelled);
            }
            let observers: &mut [&mut dyn StepObserver] = &mut [&mut tracker, &mut history];
            sim.step_observed(observers)?;
            recorder.record(sim.node_states(0)?)?;
        }
        let (_, stats) = recorder.finish()?;
        if let Some((step, peak)) = history.peak_infectious() {
            info!("Traced {}: peak of {} infectious at step {}", stats, peak, step);
        }

        let counts = sim.counts(0)?;
        Ok(TrialOutcome {
            trial: 0,
            fitness: counts.susceptible_fraction(),
            r0: sim.basic_reproduction_number(0)?,
            steps: sim.current_step(),
            counts,
            r0_series: tracker.into_series(),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }
}
