//! Readers for the plain-text input formats.
//!
//! - Edge lists ([`load_edge_list`])
//! - SEIR disease records ([`load_disease`])
//! - Fitness calculator configurations ([`load_calculator_conf`])
//! - Genotype CSVs ([`load_genotypes`])
//!
//! All readers fail on the first malformed line, before any simulation runs.

mod calculator;
mod disease_record;
mod edge_list;
mod error;
mod genotype_csv;

pub use calculator::{CalculatorConf, load_calculator_conf, read_calculator_conf};
pub use disease_record::{load_disease, parse_disease_record, read_disease};
pub use edge_list::{load_edge_list, read_edge_list, write_edge_list};
pub use error::InputError;
pub use genotype_csv::{load_genotypes, read_genotypes};
