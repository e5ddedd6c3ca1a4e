//! Fitness calculator configuration files.
//!
//! Leading label lines are skipped; the first line starting with a digit is
//! the trial count, followed by the step count and a disease record.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::InputError;
use super::disease_record::parse_disease_record;
use super::error::{is_data_line, parse_field};
use crate::schema::{DiseaseSpec, StopRule, TrialConfig};

/// Trial settings plus the disease to evaluate against.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConf {
    pub trials: usize,
    pub steps: usize,
    pub disease: DiseaseSpec,
}

impl CalculatorConf {
    /// Overlay the trial and step counts on `base`.
    pub fn trial_config(&self, base: TrialConfig) -> TrialConfig {
        TrialConfig {
            trials: self.trials,
            stop: StopRule::FixedSteps { steps: self.steps },
            ..base
        }
    }
}

pub fn read_calculator_conf<R: BufRead>(reader: R) -> Result<CalculatorConf, InputError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)))
        .skip_while(|line| matches!(line, Ok((_, l)) if !is_data_line(l)));

    let mut next = |what: &'static str, after: usize| -> Result<(usize, String), InputError> {
        lines.next().transpose()?.ok_or(InputError::Missing {
            line: after + 1,
            what,
        })
    };

    let (line_no, trials) = next("trial count", 0)?;
    let trials = parse_field(&trials, line_no, "trial count")?;
    let (line_no, steps) = next("step count", line_no)?;
    let steps = parse_field(&steps, line_no, "step count")?;
    let (line_no, disease) = next("disease record", line_no)?;
    let disease = parse_disease_record(&disease, line_no)?;

    Ok(CalculatorConf {
        trials,
        steps,
        disease,
    })
}

pub fn load_calculator_conf<P: AsRef<Path>>(path: P) -> Result<CalculatorConf, InputError> {
    read_calculator_conf(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_skipped() {
        let text = "trials\nsteps\ndisease\n50\n100\n1 2 0.25 4\n";
        let conf = read_calculator_conf(text.as_bytes()).unwrap();
        assert_eq!(conf.trials, 50);
        assert_eq!(conf.steps, 100);
        assert_eq!(conf.disease.initial_infected(), 4);

        let config = conf.trial_config(TrialConfig {
            seed: Some(3),
            ..Default::default()
        });
        assert_eq!(config.trials, 50);
        assert_eq!(config.stop, StopRule::FixedSteps { steps: 100 });
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_missing_disease_line() {
        let err = read_calculator_conf("label\n5\n10\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::Missing {
                line: 4,
                what: "disease record"
            }
        ));
    }

    #[test]
    fn test_bad_step_count() {
        let err = read_calculator_conf("5\nten\n1 1 0.5 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Number { line: 2, .. }));
    }
}
