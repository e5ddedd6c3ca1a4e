//! Read-only step observers.

use super::{CompartmentCounts, Simulation, SimulationError};

/// Hook run after every completed step. Observers only get shared access.
///
/// An error aborts the step that triggered it.
pub trait StepObserver {
    fn observe(&mut self, sim: &Simulation) -> Result<(), SimulationError>;
}

/// Records R0 of one disease after every step.
#[derive(Debug, Clone, Default)]
pub struct R0Tracker {
    disease: usize,
    series: Vec<f64>,
}

impl R0Tracker {
    pub fn new(disease: usize) -> Self {
        Self {
            disease,
            series: Vec::new(),
        }
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }

    pub fn into_series(self) -> Vec<f64> {
        self.series
    }
}

impl StepObserver for R0Tracker {
    fn observe(&mut self, sim: &Simulation) -> Result<(), SimulationError> {
        self.series.push(sim.basic_reproduction_number(self.disease)?);
        Ok(())
    }
}

/// Records compartment counts of one disease after every step.
#[derive(Debug, Clone, Default)]
pub struct CompartmentHistory {
    disease: usize,
    counts: Vec<CompartmentCounts>,
}

impl CompartmentHistory {
    pub fn new(disease: usize) -> Self {
        Self {
            disease,
            counts: Vec::new(),
        }
    }

    pub fn counts(&self) -> &[CompartmentCounts] {
        &self.counts
    }

    /// Largest Infectious count seen and the 1-based step it occurred at.
    /// Ties go to the earliest step.
    pub fn peak_infectious(&self) -> Option<(usize, usize)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, c)| (i + 1, c.infectious))
            .fold(None, |best, (step, n)| match best {
                Some((_, peak)) if peak >= n => best,
                _ => Some((step, n)),
            })
    }
}

impl StepObserver for CompartmentHistory {
    fn observe(&mut self, sim: &Simulation) -> Result<(), SimulationError> {
        self.counts.push(sim.counts(self.disease)?);
        Ok(())
    }
}
