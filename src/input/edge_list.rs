//! Edge-list network files.
//!
//! ```text
//! 4          node count
//! 0 1        one undirected edge per line
//! 1 2
//!            optional blank line; anything after it (layout
//! 0.1 0.5    coordinates) is ignored
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use super::InputError;
use super::error::parse_field;
use crate::compute::Network;

/// Parse an edge list. Node ids are bounds-checked against the declared count.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<Network, InputError> {
    let mut lines = reader.lines();

    let header = lines.next().transpose()?.ok_or(InputError::Missing {
        line: 1,
        what: "node count",
    })?;
    let num_nodes: usize = parse_field(&header, 1, "node count")?;
    let mut network = Network::new(num_nodes);

    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_no = i + 2;
        if line.trim().is_empty() {
            break;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(InputError::FieldCount {
                line: line_no,
                expected: 2,
                found: fields.len(),
            });
        }
        let a = parse_field(fields[0], line_no, "node id")?;
        let b = parse_field(fields[1], line_no, "node id")?;
        network
            .add_edge(a, b, 1)
            .map_err(|source| InputError::Network {
                line: line_no,
                source,
            })?;
    }

    Ok(network)
}

/// Load an edge-list file.
pub fn load_edge_list<P: AsRef<Path>>(path: P) -> Result<Network, InputError> {
    let file = File::open(path)?;
    read_edge_list(BufReader::new(file))
}

/// Write `network` in edge-list form, each edge once.
pub fn write_edge_list<W: Write>(w: &mut W, network: &Network) -> Result<(), InputError> {
    writeln!(w, "{}", network.num_nodes())?;
    for (a, b, _) in network.edges() {
        writeln!(w, "{a} {b}")?;
    }
    Ok(())
}
