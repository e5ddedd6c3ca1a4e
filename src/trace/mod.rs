//! Per-step node-state dumps for external visualizers.
//!
//! # Format
//!
//! ```text
//! <node> <state>      one line per node, state codes S=0 E=1 I=2 R=3
//! ...
//! <blank line>        ends each step's block
//! ...
//! end                 ends the trace
//! ```

mod format;
mod recorder;

pub use format::{END_MARKER, read_blocks, write_block, write_end};
pub use recorder::{StateRecorder, TraceStats};
