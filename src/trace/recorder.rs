//! State recorder for capturing per-step node states.

use std::fmt;
use std::io::{self, Write};

use super::format::{write_block, write_end};
use crate::compute::Compartment;

/// Writes one node-state block per recorded step to any writer.
///
/// Usage:
/// ```ignore
/// let mut recorder = StateRecorder::new(io::stdout().lock());
/// recorder.record(sim.node_states(0)?)?;
/// while !sim.is_quiescent() {
///     sim.step()?;
///     recorder.record(sim.node_states(0)?)?;
/// }
/// recorder.finish()?;
/// ```
pub struct StateRecorder<W: Write> {
    writer: W,
    frames_written: u64,
}

impl<W: Write> StateRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frames_written: 0,
        }
    }

    pub fn record(&mut self, states: &[Compartment]) -> io::Result<()> {
        write_block(&mut self.writer, states)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Write the end marker, flush, and hand back the writer.
    pub fn finish(mut self) -> io::Result<(W, TraceStats)> {
        write_end(&mut self.writer)?;
        self.writer.flush()?;
        let stats = TraceStats {
            frame_count: self.frames_written,
        };
        Ok((self.writer, stats))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

/// Statistics from a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceStats {
    pub frame_count: u64,
}

impl fmt::Display for TraceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} frames", self.frame_count)
    }
}
