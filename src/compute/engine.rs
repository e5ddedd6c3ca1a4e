//! Simulation engine - drives one trial step by step.
//!
//! Each step runs four phases in order: rewire the network, spread every
//! disease along the edges, advance the compartments, tick the dwell
//! counters.

use std::sync::Arc;

use log::trace;
use rand::Rng;
use rand::rngs::StdRng;

use super::rewiring::{self, RewireSummary};
use super::{
    Compartment, CompartmentCounts, Disease, DiseaseError, Network, NetworkError, NodeId,
    StepObserver,
};
use crate::schema::{AgentBehavior, DegreePolicy};

/// Engine construction and stepping errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Disease(#[from] DiseaseError),
    #[error("A simulation needs at least one disease")]
    NoDiseases,
    #[error("Disease {index} covers {disease_nodes} nodes but the network has {network_nodes}")]
    NodeCountMismatch {
        index: usize,
        disease_nodes: usize,
        network_nodes: usize,
    },
    #[error("Disease index {index} is out of range ({count} diseases)")]
    DiseaseIndexOutOfRange { index: usize, count: usize },
}

/// Engine switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Run the rewiring phase.
    pub dynamic: bool,
    pub degree_policy: DegreePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            dynamic: true,
            degree_policy: DegreePolicy::Enforce,
        }
    }
}

/// What happened during one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// 1-based index of the completed step.
    pub step: usize,
    /// New infections per disease.
    pub new_infections: Vec<usize>,
    pub rewiring: RewireSummary,
}

/// One trial: an owned network, one or more diseases on it, and the
/// trial's random source.
///
/// Disease 0 is the primary disease; rewiring reacts to its Infectious
/// nodes.
#[derive(Debug)]
pub struct Simulation {
    network: Network,
    diseases: Vec<Box<dyn Disease>>,
    behavior: Arc<AgentBehavior>,
    options: EngineOptions,
    rng: StdRng,
    step: usize,
}

impl Simulation {
    pub fn new(
        network: Network,
        diseases: Vec<Box<dyn Disease>>,
        behavior: Arc<AgentBehavior>,
        options: EngineOptions,
        rng: StdRng,
    ) -> Result<Self, SimulationError> {
        if diseases.is_empty() {
            return Err(SimulationError::NoDiseases);
        }
        for (index, disease) in diseases.iter().enumerate() {
            if disease.num_nodes() != network.num_nodes() {
                return Err(SimulationError::NodeCountMismatch {
                    index,
                    disease_nodes: disease.num_nodes(),
                    network_nodes: network.num_nodes(),
                });
            }
        }

        Ok(Self {
            network,
            diseases,
            behavior,
            options,
            rng,
            step: 0,
        })
    }

    /// Advance one step.
    pub fn step(&mut self) -> Result<StepReport, SimulationError> {
        self.step_observed(&mut [])
    }

    /// Advance one step, then hand read access to every observer.
    pub fn step_observed(
        &mut self,
        observers: &mut [&mut dyn StepObserver],
    ) -> Result<StepReport, SimulationError> {
        let rewiring = if self.options.dynamic {
            self.rewire()?
        } else {
            RewireSummary::default()
        };

        let mut new_infections = Vec::with_capacity(self.diseases.len());
        for index in 0..self.diseases.len() {
            new_infections.push(self.spread(index)?);
        }

        for disease in &mut self.diseases {
            disease.advance();
            disease.tick();
        }
        self.step += 1;

        trace!(
            "Step {}: {} new infections, +{} -{} edges",
            self.step,
            new_infections.first().copied().unwrap_or(0),
            rewiring.added,
            rewiring.removed
        );

        for observer in observers.iter_mut() {
            observer.observe(self)?;
        }

        Ok(StepReport {
            step: self.step,
            new_infections,
            rewiring,
        })
    }

    /// Run `steps` steps.
    pub fn run(&mut self, steps: usize) -> Result<(), SimulationError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Step until the primary disease is quiescent or `max_steps` have run.
    /// Returns the number of steps taken.
    pub fn run_until_quiescent(&mut self, max_steps: Option<usize>) -> Result<usize, SimulationError> {
        let start = self.step;
        while !self.is_quiescent() {
            if max_steps.is_some_and(|max| self.step - start >= max) {
                break;
            }
            self.step()?;
        }
        Ok(self.step - start)
    }

    fn rewire(&mut self) -> Result<RewireSummary, SimulationError> {
        let plan = rewiring::plan(
            &self.network,
            self.diseases[0].states(),
            &self.behavior,
            &mut self.rng,
        )?;
        if plan.is_empty() {
            return Ok(RewireSummary::default());
        }
        Ok(rewiring::apply(
            &plan,
            &mut self.network,
            &self.behavior,
            self.options.degree_policy,
        )?)
    }

    /// Transmission along every edge from an Infectious node to a
    /// Susceptible one. Pairs are fixed from the states before any draw, so
    /// a node next to k sources gets k independent draws and every success
    /// is credited to its source. Returns the number of distinct nodes
    /// infected.
    fn spread(&mut self, index: usize) -> Result<usize, SimulationError> {
        let disease = &mut self.diseases[index];
        let probability = disease.infection_probability();
        let target = disease.infection_target();

        let mut at_risk = Vec::new();
        for source in disease.nodes_in_state(Compartment::Infectious) {
            let mut exposed = Vec::new();
            for (neighbor, _) in self.network.neighbors(source)? {
                if disease.state(neighbor)? == Compartment::Susceptible {
                    exposed.push(neighbor);
                }
            }
            if !exposed.is_empty() {
                at_risk.push((source, exposed));
            }
        }

        let mut infected = 0;
        for (source, exposed) in at_risk {
            let mut caused = 0;
            for node in exposed {
                if self.rng.r#gen::<f32>() < probability {
                    if disease.state(node)? == Compartment::Susceptible {
                        infected += 1;
                    }
                    disease.set_state(node, target)?;
                    caused += 1;
                }
            }
            if caused > 0 {
                disease.report_caused_infections(source, caused)?;
            }
        }

        Ok(infected)
    }

    /// Steps completed so far.
    #[inline]
    pub fn current_step(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.network.num_nodes()
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[inline]
    pub fn behavior(&self) -> &AgentBehavior {
        &self.behavior
    }

    #[inline]
    pub fn num_diseases(&self) -> usize {
        self.diseases.len()
    }

    pub fn disease(&self, index: usize) -> Result<&dyn Disease, SimulationError> {
        self.diseases
            .get(index)
            .map(|d| d.as_ref())
            .ok_or(SimulationError::DiseaseIndexOutOfRange {
                index,
                count: self.diseases.len(),
            })
    }

    pub fn nodes_in_state(
        &self,
        state: Compartment,
        index: usize,
    ) -> Result<Vec<NodeId>, SimulationError> {
        Ok(self.disease(index)?.nodes_in_state(state))
    }

    /// Compartment of every node, in node order.
    pub fn node_states(&self, index: usize) -> Result<&[Compartment], SimulationError> {
        Ok(self.disease(index)?.states())
    }

    pub fn basic_reproduction_number(&self, index: usize) -> Result<f64, SimulationError> {
        Ok(self.disease(index)?.basic_reproduction_number())
    }

    pub fn counts(&self, index: usize) -> Result<CompartmentCounts, SimulationError> {
        Ok(self.disease(index)?.counts())
    }

    /// The primary disease has no Exposed or Infectious node.
    pub fn is_quiescent(&self) -> bool {
        self.diseases[0].is_quiescent()
    }
}
