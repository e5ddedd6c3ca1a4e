//! Whitespace-separated SEIR disease records:
//! `timeToI timeToR infectionProbability numToInfectAtStart`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::InputError;
use super::error::parse_field;
use crate::schema::{DiseaseSpec, SeirParams};

const FIELDS: usize = 4;

/// Parse and validate one disease record.
pub fn parse_disease_record(line: &str, line_no: usize) -> Result<DiseaseSpec, InputError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELDS {
        return Err(InputError::FieldCount {
            line: line_no,
            expected: FIELDS,
            found: fields.len(),
        });
    }

    let spec = DiseaseSpec::Seir(SeirParams {
        time_to_i: parse_field(fields[0], line_no, "dwell time")?,
        time_to_r: parse_field(fields[1], line_no, "dwell time")?,
        infection_probability: parse_field(fields[2], line_no, "probability")?,
        initial_infected: parse_field(fields[3], line_no, "infection count")?,
    });
    spec.validate().map_err(|source| InputError::OutOfRange {
        line: line_no,
        source,
    })?;
    Ok(spec)
}

/// Read a disease file: the record is on the first line.
pub fn read_disease<R: BufRead>(reader: R) -> Result<DiseaseSpec, InputError> {
    let line = reader.lines().next().transpose()?.ok_or(InputError::Missing {
        line: 1,
        what: "disease record",
    })?;
    parse_disease_record(&line, 1)
}

pub fn load_disease<P: AsRef<Path>>(path: P) -> Result<DiseaseSpec, InputError> {
    read_disease(BufReader::new(File::open(path)?))
}
