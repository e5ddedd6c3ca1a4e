//! Disease parameter types.

use serde::{Deserialize, Serialize};

use super::ConfigError;

fn default_initial_infected() -> usize {
    1
}

/// Template for one disease: kinetics plus how many nodes start infectious.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum DiseaseSpec {
    /// Susceptible → Exposed → Infectious → Removed. Removed is terminal.
    Seir(SeirParams),
    /// Susceptible → Infectious → Removed → Susceptible.
    Sirs(SirsParams),
}

impl Default for DiseaseSpec {
    fn default() -> Self {
        Self::Seir(SeirParams::default())
    }
}

impl DiseaseSpec {
    /// Per-contact, per-step transmission probability.
    pub fn infection_probability(&self) -> f32 {
        match self {
            DiseaseSpec::Seir(p) => p.infection_probability,
            DiseaseSpec::Sirs(p) => p.infection_probability,
        }
    }

    /// Number of nodes seeded as Infectious before the first step.
    pub fn initial_infected(&self) -> usize {
        match self {
            DiseaseSpec::Seir(p) => p.initial_infected,
            DiseaseSpec::Sirs(p) => p.initial_infected,
        }
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DiseaseSpec::Seir(p) => p.validate(),
            DiseaseSpec::Sirs(p) => p.validate(),
        }
    }
}

/// SEIR kinetics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeirParams {
    /// Dwell steps in Exposed before becoming Infectious.
    pub time_to_i: u16,
    /// Dwell steps in Infectious before becoming Removed.
    pub time_to_r: u16,
    /// Per-contact, per-step transmission probability.
    pub infection_probability: f32,
    /// Nodes seeded as Infectious.
    #[serde(default = "default_initial_infected")]
    pub initial_infected: usize,
}

impl Default for SeirParams {
    fn default() -> Self {
        Self {
            time_to_i: 2,
            time_to_r: 5,
            infection_probability: 0.1,
            initial_infected: default_initial_infected(),
        }
    }
}

impl SeirParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dwell("time_to_i", self.time_to_i)?;
        check_dwell("time_to_r", self.time_to_r)?;
        check_probability("infection_probability", self.infection_probability)
    }
}

/// SIRS kinetics for a beneficial contagion (information, habits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SirsParams {
    /// Dwell steps in Infectious before becoming Removed.
    pub time_to_r: u16,
    /// Dwell steps in Removed before becoming Susceptible again.
    pub time_to_s: u16,
    /// Per-contact, per-step transmission probability.
    pub infection_probability: f32,
    /// Nodes seeded as Infectious.
    #[serde(default = "default_initial_infected")]
    pub initial_infected: usize,
}

impl SirsParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dwell("time_to_r", self.time_to_r)?;
        check_dwell("time_to_s", self.time_to_s)?;
        check_probability("infection_probability", self.infection_probability)
    }
}

pub(crate) fn check_probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

fn check_dwell(name: &'static str, value: u16) -> Result<(), ConfigError> {
    if value > i16::MAX as u16 {
        return Err(ConfigError::DwellOutOfRange { name, value });
    }
    Ok(())
}
