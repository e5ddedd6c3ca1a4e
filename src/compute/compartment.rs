//! Compartments of the per-node infection state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Infection state of a single node.
///
/// The discriminants are the wire codes used by the state dump.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Compartment {
    #[default]
    Susceptible = 0,
    /// Infected, not yet infectious.
    Exposed = 1,
    Infectious = 2,
    /// Removed or recovered.
    Removed = 3,
}

impl Compartment {
    pub const ALL: [Compartment; 4] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infectious,
        Compartment::Removed,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Compartment::Susceptible),
            1 => Some(Compartment::Exposed),
            2 => Some(Compartment::Infectious),
            3 => Some(Compartment::Removed),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Compartment::Susceptible => 'S',
            Compartment::Exposed => 'E',
            Compartment::Infectious => 'I',
            Compartment::Removed => 'R',
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Number of nodes in each compartment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentCounts {
    pub susceptible: usize,
    pub exposed: usize,
    pub infectious: usize,
    pub removed: usize,
}

impl CompartmentCounts {
    pub fn from_states(states: &[Compartment]) -> Self {
        let mut counts = Self::default();
        for &state in states {
            *counts.get_mut(state) += 1;
        }
        counts
    }

    pub fn get(&self, compartment: Compartment) -> usize {
        match compartment {
            Compartment::Susceptible => self.susceptible,
            Compartment::Exposed => self.exposed,
            Compartment::Infectious => self.infectious,
            Compartment::Removed => self.removed,
        }
    }

    fn get_mut(&mut self, compartment: Compartment) -> &mut usize {
        match compartment {
            Compartment::Susceptible => &mut self.susceptible,
            Compartment::Exposed => &mut self.exposed,
            Compartment::Infectious => &mut self.infectious,
            Compartment::Removed => &mut self.removed,
        }
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.exposed + self.infectious + self.removed
    }

    /// Fraction of nodes still susceptible (0 for an empty population).
    pub fn susceptible_fraction(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.susceptible as f32 / total as f32
        }
    }
}

impl fmt::Display for CompartmentCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} S, {} E, {} I, {} R",
            self.susceptible, self.exposed, self.infectious, self.removed
        )
    }
}
