//! Genotype CSV files: four comma-separated floats per line, in the order
//! `minConnections, maxConnections, removeInfectedNeighborProb,
//! addNeighborOfNeighborProb`. Header and other non-numeric lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::InputError;
use super::error::{is_data_line, parse_field};
use crate::schema::Genotype;

pub fn read_genotypes<R: BufRead>(reader: R) -> Result<Vec<Genotype>, InputError> {
    let mut genotypes = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if !is_data_line(&line) {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != Genotype::BEHAVIOR_GENES {
            return Err(InputError::FieldCount {
                line: line_no,
                expected: Genotype::BEHAVIOR_GENES,
                found: fields.len(),
            });
        }
        let genes = fields
            .iter()
            .map(|f| parse_field::<f32>(f, line_no, "gene"))
            .collect::<Result<Vec<_>, _>>()?;

        let genotype = Genotype::new(genes);
        genotype
            .to_behavior()
            .map_err(|source| InputError::OutOfRange {
                line: line_no,
                source,
            })?;
        genotypes.push(genotype);
    }

    Ok(genotypes)
}

pub fn load_genotypes<P: AsRef<Path>>(path: P) -> Result<Vec<Genotype>, InputError> {
    read_genotypes(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_with_header() {
        let text = "minConnections,maxConnections,removeProb,addProb\n\
                    1,10,0.5,0.01\n\
                    \n\
                    2, 20, 0.25, 0\n";
        let genotypes = read_genotypes(text.as_bytes()).unwrap();
        assert_eq!(genotypes.len(), 2);
        assert_eq!(genotypes[1].genes(), &[2.0, 20.0, 0.25, 0.0]);
    }

    #[test]
    fn test_wrong_gene_count() {
        let err = read_genotypes("1,2,0.5\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::FieldCount {
                line: 1,
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn test_invalid_genes() {
        assert!(matches!(
            read_genotypes("1,2,abc,0.1\n".as_bytes()),
            Err(InputError::Number { line: 1, .. })
        ));
        assert!(matches!(
            read_genotypes("5,2,0.5,0.1\n".as_bytes()),
            Err(InputError::OutOfRange { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# sweep").unwrap();
        writeln!(file, "0,5,1,0").unwrap();
        file.flush().unwrap();

        let genotypes = load_genotypes(file.path()).unwrap();
        let behavior = genotypes[0].to_behavior().unwrap();
        assert_eq!(behavior.max_connections, 5);
        assert_eq!(behavior.remove_infected_neighbor_prob, 1.0);
    }
}
