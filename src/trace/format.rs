//! Text format of the per-step node-state dump.

use std::io::{self, BufRead, Write};

use crate::compute::Compartment;

/// Line that terminates a trace.
pub const END_MARKER: &str = "end";

/// Write one step's block: `"<node> <code>"` per node, then a blank line.
pub fn write_block<W: Write>(w: &mut W, states: &[Compartment]) -> io::Result<()> {
    for (node, state) in states.iter().enumerate() {
        writeln!(w, "{} {}", node, state.code())?;
    }
    writeln!(w)
}

/// Write the end marker.
pub fn write_end<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "{END_MARKER}")
}

fn invalid(line: usize, msg: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("line {line}: {msg}"))
}

/// Parse a trace back into one state vector per block.
///
/// Reading stops at the end marker or EOF. Nodes must appear in order
/// starting at 0.
pub fn read_blocks<R: BufRead>(r: R) -> io::Result<Vec<Vec<Compartment>>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for (i, line) in r.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let line = line.trim();

        if line == END_MARKER {
            break;
        }
        if line.is_empty() {
            blocks.push(std::mem::take(&mut current));
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(node), Some(code), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(invalid(line_no, "expected `<node> <state>`"));
        };
        let node: usize = node.parse().map_err(|e| invalid(line_no, e))?;
        let code: u8 = code.parse().map_err(|e| invalid(line_no, e))?;
        let state =
            Compartment::from_code(code).ok_or_else(|| invalid(line_no, "unknown state code"))?;

        if node != current.len() {
            return Err(invalid(
                line_no,
                format!("expected node {}, found {node}", current.len()),
            ));
        }
        current.push(state);
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    Ok(blocks)
}
