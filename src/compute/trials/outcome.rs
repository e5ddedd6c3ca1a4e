//! Per-trial results and their aggregation.

use serde::{Deserialize, Serialize};

use crate::compute::CompartmentCounts;

/// Summary of one finished trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Trial index.
    pub trial: usize,
    /// Final fraction of nodes still Susceptible.
    pub fitness: f32,
    /// Final R0 of the primary disease.
    pub r0: f64,
    /// Steps actually run.
    pub steps: usize,
    /// Final compartment counts of the primary disease.
    pub counts: CompartmentCounts,
    /// R0 after every step. Empty when tracking is off.
    pub r0_series: Vec<f64>,
    pub elapsed_seconds: f64,
}

/// Aggregate over every trial of a harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessReport {
    /// Outcomes ordered by trial index.
    pub trials: Vec<TrialOutcome>,
    /// Mean susceptible fraction.
    pub fitness: f32,
    /// Mean final R0.
    pub mean_r0: f64,
    /// Elementwise mean R0 series.
    pub r0_series: Vec<f64>,
    /// Mean of the strictly positive entries of `r0_series`.
    pub mean_nonzero_r0: f64,
    pub elapsed_seconds: f64,
}

impl HarnessReport {
    /// Aggregate outcomes. `trials` is sorted by trial index first.
    pub fn aggregate(mut trials: Vec<TrialOutcome>, elapsed_seconds: f64) -> Self {
        trials.sort_by_key(|t| t.trial);

        let n = trials.len();
        let (fitness, mean_r0) = if n == 0 {
            (0.0, 0.0)
        } else {
            (
                trials.iter().map(|t| t.fitness).sum::<f32>() / n as f32,
                trials.iter().map(|t| t.r0).sum::<f64>() / n as f64,
            )
        };

        let r0_series = mean_series(trials.iter().map(|t| t.r0_series.as_slice()));
        let mean_nonzero_r0 = mean_nonzero(&r0_series);

        Self {
            trials,
            fitness,
            mean_r0,
            r0_series,
            mean_nonzero_r0,
            elapsed_seconds,
        }
    }
}

/// Elementwise mean of series of possibly different lengths.
///
/// Shorter series are padded with their last value; an empty series pads
/// with zero.
pub fn mean_series<'a, I>(series: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
    I::IntoIter: Clone,
{
    let series = series.into_iter();
    let len = series.clone().map(<[f64]>::len).max().unwrap_or(0);
    let mut sums = vec![0.0; len];
    let mut count = 0usize;

    for s in series {
        count += 1;
        let pad = s.last().copied().unwrap_or(0.0);
        for (i, sum) in sums.iter_mut().enumerate() {
            *sum += s.get(i).copied().unwrap_or(pad);
        }
    }

    if count > 0 {
        for sum in &mut sums {
            *sum /= count as f64;
        }
    }
    sums
}

/// Mean of the strictly positive values, 0 when there are none.
pub fn mean_nonzero(values: &[f64]) -> f64 {
    let (n, total) = values
        .iter()
        .filter(|&&v| v > 0.0)
        .fold((0usize, 0.0), |(n, sum), &v| (n + 1, sum + v));
    if n == 0 { 0.0 } else { total / n as f64 }
}
