//! Agent behavior (rewiring policy) and the genotype encoding it.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use super::disease::check_probability;

/// Immutable rewiring policy shared by every trial of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentBehavior {
    /// Lower degree bound (see `DegreePolicy`).
    pub min_connections: usize,
    /// Upper degree bound (see `DegreePolicy`).
    pub max_connections: usize,
    /// Probability of dropping the edge to an infectious neighbor.
    pub remove_infected_neighbor_prob: f32,
    /// Probability of adding an edge to each neighbor-of-neighbor.
    pub add_neighbor_of_neighbor_prob: f32,
}

impl Default for AgentBehavior {
    /// A behavior that never rewires.
    fn default() -> Self {
        Self {
            min_connections: 0,
            max_connections: usize::MAX,
            remove_infected_neighbor_prob: 0.0,
            add_neighbor_of_neighbor_prob: 0.0,
        }
    }
}

impl AgentBehavior {
    pub fn new(
        min_connections: usize,
        max_connections: usize,
        remove_infected_neighbor_prob: f32,
        add_neighbor_of_neighbor_prob: f32,
    ) -> Self {
        Self {
            min_connections,
            max_connections,
            remove_infected_neighbor_prob,
            add_neighbor_of_neighbor_prob,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_connections > self.max_connections {
            return Err(ConfigError::ConnectionBounds {
                min: self.min_connections,
                max: self.max_connections,
            });
        }
        check_probability(
            "remove_infected_neighbor_prob",
            self.remove_infected_neighbor_prob,
        )?;
        check_probability(
            "add_neighbor_of_neighbor_prob",
            self.add_neighbor_of_neighbor_prob,
        )
    }
}

/// Flat real-valued parameter vector searched over by an optimizer.
///
/// Gene order: `min_connections, max_connections,
/// remove_infected_neighbor_prob, add_neighbor_of_neighbor_prob`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    genes: Vec<f32>,
}

impl Genotype {
    /// Number of genes that encode an [`AgentBehavior`].
    pub const BEHAVIOR_GENES: usize = 4;

    pub fn new(genes: Vec<f32>) -> Self {
        Self { genes }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.genes.get(index).copied()
    }

    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    /// Decode into a behavior. Connection counts truncate toward zero.
    pub fn to_behavior(&self) -> Result<AgentBehavior, ConfigError> {
        if self.genes.len() != Self::BEHAVIOR_GENES {
            return Err(ConfigError::GenotypeLength {
                expected: Self::BEHAVIOR_GENES,
                found: self.genes.len(),
            });
        }
        for (index, &value) in self.genes.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidGene { index, value });
            }
        }

        let behavior = AgentBehavior {
            min_connections: self.genes[0] as usize,
            max_connections: self.genes[1] as usize,
            remove_infected_neighbor_prob: self.genes[2],
            add_neighbor_of_neighbor_prob: self.genes[3],
        };
        behavior.validate()?;
        Ok(behavior)
    }
}

impl From<AgentBehavior> for Genotype {
    fn from(b: AgentBehavior) -> Self {
        Self::new(vec![
            b.min_connections as f32,
            b.max_connections as f32,
            b.remove_infected_neighbor_prob,
            b.add_neighbor_of_neighbor_prob,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_never_rewires() {
        let b = AgentBehavior::default();
        assert!(b.validate().is_ok());
        assert_eq!(b.remove_infected_neighbor_prob, 0.0);
        assert_eq!(b.add_neighbor_of_neighbor_prob, 0.0);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let b = AgentBehavior::new(5, 2, 0.1, 0.1);
        assert_eq!(
            b.validate(),
            Err(ConfigError::ConnectionBounds { min: 5, max: 2 })
        );
    }

    #[test]
    fn test_genotype_decode_truncates() {
        let g = Genotype::new(vec![1.9, 12.2, 0.5, 0.01]);
        let b = g.to_behavior().unwrap();
        assert_eq!(b.min_connections, 1);
        assert_eq!(b.max_connections, 12);
        assert_eq!(b.remove_infected_neighbor_prob, 0.5);
    }

    #[test]
    fn test_genotype_wrong_length() {
        let g = Genotype::new(vec![1.0, 2.0, 0.5]);
        assert_eq!(
            g.to_behavior(),
            Err(ConfigError::GenotypeLength {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_genotype_negative_gene() {
        let g = Genotype::new(vec![-1.0, 2.0, 0.5, 0.5]);
        assert!(matches!(
            g.to_behavior(),
            Err(ConfigError::InvalidGene { index: 0, .. })
        ));
    }

    #[test]
    fn test_genotype_probability_checked() {
        let g = Genotype::new(vec![0.0, 2.0, 1.5, 0.5]);
        assert!(matches!(
            g.to_behavior(),
            Err(ConfigError::InvalidProbability { .. })
        ));
    }
}
