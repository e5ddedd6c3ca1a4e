//! Genotype scoring.

use log::info;
use serde::Serialize;

use super::{HarnessError, TrialHarness};
use crate::schema::Genotype;

/// Rates a genotype. Higher is better.
pub trait FitnessCalculator {
    fn calculate_fitness(&self, genotype: &Genotype) -> Result<f32, HarnessError>;
}

impl FitnessCalculator for TrialHarness {
    /// Mean susceptible fraction over all trials, with the genotype's
    /// behavior in place of the harness's own.
    fn calculate_fitness(&self, genotype: &Genotype) -> Result<f32, HarnessError> {
        let behavior = genotype.to_behavior()?;
        self.with_behavior(behavior)?.mean_fitness()
    }
}

/// A genotype with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGenotype {
    pub genotype: Genotype,
    pub fitness: f32,
}

/// Score every genotype and sort best first. Ties keep input order.
pub fn rank_genotypes<C>(
    calculator: &C,
    genotypes: &[Genotype],
) -> Result<Vec<RankedGenotype>, HarnessError>
where
    C: FitnessCalculator + ?Sized,
{
    let mut ranked = Vec::with_capacity(genotypes.len());
    for (i, genotype) in genotypes.iter().enumerate() {
        let fitness = calculator.calculate_fitness(genotype)?;
        info!("Genotype {} {:?}: fitness {:.4}", i, genotype.genes(), fitness);
        ranked.push(RankedGenotype {
            genotype: genotype.clone(),
            fitness,
        });
    }
    ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::generate;
    use crate::schema::{AgentBehavior, ConfigError, DiseaseSpec, SeirParams, StopRule, TrialConfig};

    struct GeneSum;

    impl FitnessCalculator for GeneSum {
        fn calculate_fitness(&self, genotype: &Genotype) -> Result<f32, HarnessError> {
            Ok(genotype.genes().iter().sum())
        }
    }

    #[test]
    fn test_rank_best_first() {
        let genotypes = vec![
            Genotype::new(vec![1.0, 1.0]),
            Genotype::new(vec![5.0, 0.0]),
            Genotype::new(vec![0.5, 0.0]),
            Genotype::new(vec![2.0, 0.0]),
        ];
        let ranked = rank_genotypes(&GeneSum, &genotypes).unwrap();
        let scores: Vec<_> = ranked.iter().map(|r| r.fitness).collect();
        assert_eq!(scores, vec![5.0, 2.0, 2.0, 0.5]);
        // Stable for ties
        assert_eq!(ranked[1].genotype, genotypes[0]);
    }

    fn harness() -> TrialHarness {
        let spec = DiseaseSpec::Seir(SeirParams {
            time_to_i: 1,
            time_to_r: 1,
            infection_probability: 1.0,
            initial_infected: 1,
        });
        TrialHarness::from_specs(
            generate::complete(30),
            &[spec],
            AgentBehavior::default(),
            TrialConfig {
                trials: 4,
                stop: StopRule::FixedSteps { steps: 5 },
                seed: Some(11),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_harness_scores_genotypes() {
        let harness = harness();
        // Cutting every infectious contact protects everyone else
        let cautious = Genotype::new(vec![0.0, 100.0, 1.0, 0.0]);
        let careless = Genotype::new(vec![0.0, 100.0, 0.0, 0.0]);

        let fitness = harness.calculate_fitness(&cautious).unwrap();
        assert!((fitness - 29.0 / 30.0).abs() < 1e-6);
        assert_eq!(harness.calculate_fitness(&careless).unwrap(), 0.0);

        let ranked = rank_genotypes(&harness, &[careless, cautious.clone()]).unwrap();
        assert_eq!(ranked[0].genotype, cautious);
    }

    #[test]
    fn test_bad_genotype_rejected() {
        let err = harness()
            .calculate_fitness(&Genotype::new(vec![1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Config(ConfigError::GenotypeLength { .. })
        ));
    }
}
