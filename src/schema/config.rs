//! Configuration types for trial batches and whole experiments.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{AgentBehavior, DiseaseSpec};

fn default_true() -> bool {
    true
}

fn default_trials() -> usize {
    100
}

/// When a single trial stops stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule")]
pub enum StopRule {
    /// Run exactly `steps` steps.
    FixedSteps { steps: usize },
    /// Run until the primary disease has no Exposed or Infectious node.
    Quiescence {
        /// Optional hard cap on the number of steps.
        #[serde(default)]
        max_steps: Option<usize>,
    },
}

impl Default for StopRule {
    fn default() -> Self {
        Self::FixedSteps { steps: 100 }
    }
}

impl StopRule {
    /// Upper bound on steps, if any.
    pub fn step_limit(&self) -> Option<usize> {
        match *self {
            StopRule::FixedSteps { steps } => Some(steps),
            StopRule::Quiescence { max_steps } => max_steps,
        }
    }

    /// Whether the trial ends early once the epidemic dies out.
    pub fn stops_on_quiescence(&self) -> bool {
        matches!(self, StopRule::Quiescence { .. })
    }
}

/// How `min_connections` / `max_connections` constrain rewiring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegreePolicy {
    /// Skip additions that would push an endpoint above `max_connections`
    /// and removals that would drop an endpoint below `min_connections`.
    #[default]
    Enforce,
    /// Connection bounds are carried but never consulted.
    Ignore,
}

/// Settings for a batch of independent trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Number of independent trials.
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Stopping rule for each trial.
    #[serde(default)]
    pub stop: StopRule,
    /// Run the rewiring phase each step. `false` keeps the topology fixed.
    #[serde(default = "default_true")]
    pub dynamic: bool,
    /// Treatment of the behavior's connection bounds.
    #[serde(default)]
    pub degree_policy: DegreePolicy,
    /// Record R0 after every step.
    #[serde(default = "default_true")]
    pub track_r0: bool,
    /// Worker thread cap. `None` uses the global rayon pool.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Base seed; trial `k` uses `seed + k`. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Wall-clock budget per trial in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            stop: StopRule::default(),
            dynamic: true,
            degree_policy: DegreePolicy::default(),
            track_r0: true,
            threads: None,
            seed: None,
            deadline_ms: None,
        }
    }
}

impl TrialConfig {
    /// Validate trial settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        if let StopRule::FixedSteps { steps: 0 } = self.stop {
            return Err(ConfigError::NoSteps);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreads);
        }
        Ok(())
    }
}

/// Where the contact network of an experiment comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetworkSource {
    /// Edge-list text file.
    EdgeList { path: PathBuf },
    /// Complete graph.
    Complete { nodes: usize },
    /// Ring where every node has degree 2.
    Ring { nodes: usize },
    /// Complete components joined pairwise by small complete gates.
    CliqueGate {
        components: usize,
        component_size: usize,
        gate_size: usize,
    },
}

/// Top-level experiment description, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Contact network.
    pub network: NetworkSource,
    /// Diseases sharing the network. Index 0 is the primary disease that
    /// drives rewiring, fitness and quiescence.
    pub diseases: Vec<DiseaseSpec>,
    /// Rewiring policy shared by every trial.
    #[serde(default)]
    pub behavior: AgentBehavior,
    /// Trial batch settings.
    #[serde(default)]
    pub trials: TrialConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            network: NetworkSource::Ring { nodes: 1000 },
            diseases: vec![DiseaseSpec::default()],
            behavior: AgentBehavior {
                min_connections: 1,
                max_connections: 20,
                remove_infected_neighbor_prob: 0.3,
                add_neighbor_of_neighbor_prob: 0.001,
            },
            trials: TrialConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Validate every part of the experiment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.diseases.is_empty() {
            return Err(ConfigError::NoDiseases);
        }
        for disease in &self.diseases {
            disease.validate()?;
        }
        self.behavior.validate()?;
        self.trials.validate()?;

        match self.network {
            NetworkSource::Complete { nodes } | NetworkSource::Ring { nodes } if nodes == 0 => {
                Err(ConfigError::InvalidNetwork("node count must be non-zero".into()))
            }
            NetworkSource::CliqueGate {
                components,
                component_size,
                ..
            } if components == 0 || component_size == 0 => Err(ConfigError::InvalidNetwork(
                "clique-gate graph needs at least one non-empty component".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f32 },
    #[error("{name} must fit a non-negative 16 bit signed integer, got {value}")]
    DwellOutOfRange { name: &'static str, value: u16 },
    #[error("min_connections ({min}) exceeds max_connections ({max})")]
    ConnectionBounds { min: usize, max: usize },
    #[error("Trial count must be non-zero")]
    NoTrials,
    #[error("Fixed-step runs need at least one step")]
    NoSteps,
    #[error("Thread cap must be non-zero")]
    InvalidThreads,
    #[error("At least one disease is required")]
    NoDiseases,
    #[error("Genotype must have {expected} genes, found {found}")]
    GenotypeLength { expected: usize, found: usize },
    #[error("Gene {index} must be finite and non-negative, got {value}")]
    InvalidGene { index: usize, value: f32 },
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),
}
