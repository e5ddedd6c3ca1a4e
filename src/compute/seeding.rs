//! Initial infection strategies.

use std::fmt;

use rand::rngs::StdRng;

use super::{Compartment, Disease, DiseaseError};

/// Seeds a freshly instantiated disease before the first step.
pub trait InitialInfectionStrategy: Send + Sync + fmt::Debug {
    /// Number of nodes this strategy infects.
    fn initial_infections(&self) -> usize;

    fn apply(&self, disease: &mut dyn Disease, rng: &mut StdRng) -> Result<(), DiseaseError>;
}

/// Infect exactly `n` distinct nodes chosen uniformly at random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfectN {
    pub n: usize,
}

impl InfectN {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl InitialInfectionStrategy for InfectN {
    fn initial_infections(&self) -> usize {
        self.n
    }

    fn apply(&self, disease: &mut dyn Disease, rng: &mut StdRng) -> Result<(), DiseaseError> {
        let num_nodes = disease.num_nodes();
        if self.n > num_nodes {
            return Err(DiseaseError::TooManyInitialInfections {
                requested: self.n,
                num_nodes,
            });
        }

        for node in rand::seq::index::sample(rng, num_nodes, self.n) {
            disease.set_state(node, Compartment::Infectious)?;
        }
        Ok(())
    }
}
