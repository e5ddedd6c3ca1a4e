//! Disease state machines.
//!
//! The engine only talks to the [`Disease`] capability: per-node compartment
//! storage, a dwell-threshold `advance` step, and a rate query. [`Seir`] and
//! [`Sirs`] are the two variants. Parameters live behind an `Arc`, so a
//! clone copies node state and counters but shares the immutable kinetics.

use std::fmt;
use std::sync::Arc;

use super::{Compartment, CompartmentCounts, NodeId};
use crate::schema::{DiseaseSpec, SeirParams, SirsParams};

/// Disease access errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiseaseError {
    #[error("Node {node} is out of range for a disease over {num_nodes} nodes")]
    NodeOutOfRange { node: NodeId, num_nodes: usize },
    #[error("Cannot seed {requested} initial infections in a population of {num_nodes}")]
    TooManyInitialInfections { requested: usize, num_nodes: usize },
}

/// Which state machine a disease follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiseaseKind {
    Seir,
    Sirs,
}

/// Per-node compartment, dwell time and caused-infection counters.
///
/// Sized at construction; every accessor is bounds-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCompartments {
    states: Vec<Compartment>,
    dwell: Vec<u32>,
    caused: Vec<u32>,
}

impl NodeCompartments {
    /// All nodes start Susceptible with zeroed counters.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            states: vec![Compartment::Susceptible; num_nodes],
            dwell: vec![0; num_nodes],
            caused: vec![0; num_nodes],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    fn check(&self, node: NodeId) -> Result<(), DiseaseError> {
        if node < self.states.len() {
            Ok(())
        } else {
            Err(DiseaseError::NodeOutOfRange {
                node,
                num_nodes: self.states.len(),
            })
        }
    }

    pub fn state(&self, node: NodeId) -> Result<Compartment, DiseaseError> {
        self.check(node)?;
        Ok(self.states[node])
    }

    pub fn dwell(&self, node: NodeId) -> Result<u32, DiseaseError> {
        self.check(node)?;
        Ok(self.dwell[node])
    }

    pub fn caused_infections(&self, node: NodeId) -> Result<u32, DiseaseError> {
        self.check(node)?;
        Ok(self.caused[node])
    }

    #[inline]
    pub fn states(&self) -> &[Compartment] {
        &self.states
    }

    /// Set a node's compartment and reset its dwell counter.
    /// Returns the previous compartment.
    pub fn set(&mut self, node: NodeId, state: Compartment) -> Result<Compartment, DiseaseError> {
        self.check(node)?;
        let previous = std::mem::replace(&mut self.states[node], state);
        self.dwell[node] = 0;
        Ok(previous)
    }

    pub fn increment_dwell(&mut self, node: NodeId) -> Result<(), DiseaseError> {
        self.check(node)?;
        self.dwell[node] = self.dwell[node].saturating_add(1);
        Ok(())
    }

    /// Increment every dwell counter once.
    pub fn tick(&mut self) {
        for d in &mut self.dwell {
            *d = d.saturating_add(1);
        }
    }

    pub fn add_caused(&mut self, node: NodeId, count: u32) -> Result<(), DiseaseError> {
        self.check(node)?;
        self.caused[node] = self.caused[node].saturating_add(count);
        Ok(())
    }

    pub fn nodes_in(&self, state: Compartment) -> Vec<NodeId> {
        self.states
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == state)
            .map(|(node, _)| node)
            .collect()
    }

    pub fn count(&self, state: Compartment) -> usize {
        self.states.iter().filter(|&&s| s == state).count()
    }

    pub fn counts(&self) -> CompartmentCounts {
        CompartmentCounts::from_states(&self.states)
    }

    /// Mean caused-infection count over nodes that caused at least one.
    /// Zero when nobody has infected anyone.
    pub fn basic_reproduction_number(&self) -> f64 {
        let (spreaders, total) = self
            .caused
            .iter()
            .filter(|&&c| c > 0)
            .fold((0u64, 0u64), |(n, sum), &c| (n + 1, sum + u64::from(c)));
        if spreaders == 0 {
            0.0
        } else {
            total as f64 / spreaders as f64
        }
    }
}

/// Capability shared by every disease model the engine can run.
pub trait Disease: Send + Sync + fmt::Debug {
    fn kind(&self) -> DiseaseKind;

    /// Read-only per-node storage.
    fn compartments(&self) -> &NodeCompartments;

    /// Per-contact, per-step transmission probability.
    fn infection_probability(&self) -> f32;

    /// Compartment a susceptible node enters on successful transmission.
    fn infection_target(&self) -> Compartment;

    /// Move a node to `state`, resetting its dwell counter.
    fn set_state(&mut self, node: NodeId, state: Compartment) -> Result<(), DiseaseError>;

    fn increment_dwell(&mut self, node: NodeId) -> Result<(), DiseaseError>;

    /// Increment every node's dwell counter once.
    fn tick(&mut self);

    /// Apply the dwell-threshold transitions for one step. Thresholds are
    /// compared for equality against the dwell values before this step's tick.
    fn advance(&mut self);

    /// Credit `count` secondary infections to `source`.
    fn report_caused_infections(&mut self, source: NodeId, count: u32)
    -> Result<(), DiseaseError>;

    /// Model-specific score in `[0, 1]`.
    fn rate(&self) -> f64;

    fn clone_box(&self) -> Box<dyn Disease>;

    fn num_nodes(&self) -> usize {
        self.compartments().len()
    }

    fn state(&self, node: NodeId) -> Result<Compartment, DiseaseError> {
        self.compartments().state(node)
    }

    fn dwell(&self, node: NodeId) -> Result<u32, DiseaseError> {
        self.compartments().dwell(node)
    }

    fn states(&self) -> &[Compartment] {
        self.compartments().states()
    }

    fn nodes_in_state(&self, state: Compartment) -> Vec<NodeId> {
        self.compartments().nodes_in(state)
    }

    fn counts(&self) -> CompartmentCounts {
        self.compartments().counts()
    }

    fn basic_reproduction_number(&self) -> f64 {
        self.compartments().basic_reproduction_number()
    }

    /// No node is Exposed or Infectious.
    fn is_quiescent(&self) -> bool {
        !self
            .states()
            .iter()
            .any(|&s| matches!(s, Compartment::Exposed | Compartment::Infectious))
    }
}

impl Clone for Box<dyn Disease> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Instantiate a disease over `num_nodes` nodes, all Susceptible.
pub fn instantiate(spec: &DiseaseSpec, num_nodes: usize) -> Box<dyn Disease> {
    match spec {
        DiseaseSpec::Seir(params) => Box::new(Seir::new(params.clone(), num_nodes)),
        DiseaseSpec::Sirs(params) => Box::new(Sirs::new(params.clone(), num_nodes)),
    }
}

/// Classic SEIR: S → E → I → R, with R terminal.
#[derive(Debug, Clone)]
pub struct Seir {
    params: Arc<SeirParams>,
    nodes: NodeCompartments,
}

impl Seir {
    pub fn new(params: SeirParams, num_nodes: usize) -> Self {
        Self {
            params: Arc::new(params),
            nodes: NodeCompartments::new(num_nodes),
        }
    }

    pub fn params(&self) -> &SeirParams {
        &self.params
    }
}

impl Disease for Seir {
    fn kind(&self) -> DiseaseKind {
        DiseaseKind::Seir
    }

    fn compartments(&self) -> &NodeCompartments {
        &self.nodes
    }

    fn infection_probability(&self) -> f32 {
        self.params.infection_probability
    }

    fn infection_target(&self) -> Compartment {
        Compartment::Exposed
    }

    fn set_state(&mut self, node: NodeId, state: Compartment) -> Result<(), DiseaseError> {
        self.nodes.set(node, state).map(|_| ())
    }

    fn increment_dwell(&mut self, node: NodeId) -> Result<(), DiseaseError> {
        self.nodes.increment_dwell(node)
    }

    fn tick(&mut self) {
        self.nodes.tick();
    }

    fn advance(&mut self) {
        let exposed = self.nodes.nodes_in(Compartment::Exposed);
        let infectious = self.nodes.nodes_in(Compartment::Infectious);
        let time_to_i = u32::from(self.params.time_to_i);
        let time_to_r = u32::from(self.params.time_to_r);

        // Node ids come from our own storage
        for node in exposed {
            if self.nodes.dwell[node] == time_to_i {
                self.nodes.states[node] = Compartment::Infectious;
                self.nodes.dwell[node] = 0;
            }
        }
        for node in infectious {
            if self.nodes.dwell[node] == time_to_r {
                self.nodes.states[node] = Compartment::Removed;
                self.nodes.dwell[node] = 0;
            }
        }
    }

    fn report_caused_infections(
        &mut self,
        source: NodeId,
        count: u32,
    ) -> Result<(), DiseaseError> {
        self.nodes.add_caused(source, count)
    }

    /// Fraction of nodes still susceptible.
    fn rate(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.count(Compartment::Susceptible) as f64 / self.nodes.len() as f64
    }

    fn clone_box(&self) -> Box<dyn Disease> {
        Box::new(self.clone())
    }
}

/// SIRS contagion with waning immunity: S → I → R → S.
#[derive(Debug, Clone)]
pub struct Sirs {
    params: Arc<SirsParams>,
    nodes: NodeCompartments,
    num_infectious: usize,
}

impl Sirs {
    pub fn new(params: SirsParams, num_nodes: usize) -> Self {
        Self {
            params: Arc::new(params),
            nodes: NodeCompartments::new(num_nodes),
            num_infectious: 0,
        }
    }

    pub fn params(&self) -> &SirsParams {
        &self.params
    }

    /// Running count of Infectious nodes.
    pub fn num_infectious(&self) -> usize {
        self.num_infectious
    }

    fn transition(&mut self, node: NodeId, state: Compartment) -> Result<(), DiseaseError> {
        let previous = self.nodes.set(node, state)?;
        let was = previous == Compartment::Infectious;
        let is = state == Compartment::Infectious;
        if is && !was {
            self.num_infectious += 1;
        } else if was && !is {
            self.num_infectious -= 1;
        }
        Ok(())
    }
}

impl Disease for Sirs {
    fn kind(&self) -> DiseaseKind {
        DiseaseKind::Sirs
    }

    fn compartments(&self) -> &NodeCompartments {
        &self.nodes
    }

    fn infection_probability(&self) -> f32 {
        self.params.infection_probability
    }

    fn infection_target(&self) -> Compartment {
        Compartment::Infectious
    }

    fn set_state(&mut self, node: NodeId, state: Compartment) -> Result<(), DiseaseError> {
        self.transition(node, state)
    }

    fn increment_dwell(&mut self, node: NodeId) -> Result<(), DiseaseError> {
        self.nodes.increment_dwell(node)
    }

    fn tick(&mut self) {
        self.nodes.tick();
    }

    fn advance(&mut self) {
        let infectious = self.nodes.nodes_in(Compartment::Infectious);
        let removed = self.nodes.nodes_in(Compartment::Removed);
        let time_to_r = u32::from(self.params.time_to_r);
        let time_to_s = u32::from(self.params.time_to_s);

        for node in infectious {
            if self.nodes.dwell[node] == time_to_r {
                self.nodes.states[node] = Compartment::Removed;
                self.nodes.dwell[node] = 0;
                self.num_infectious -= 1;
            }
        }
        for node in removed {
            if self.nodes.dwell[node] == time_to_s {
                self.nodes.states[node] = Compartment::Susceptible;
                self.nodes.dwell[node] = 0;
            }
        }
    }

    fn report_caused_infections(
        &mut self,
        source: NodeId,
        count: u32,
    ) -> Result<(), DiseaseError> {
        self.nodes.add_caused(source, count)
    }

    /// Fraction of nodes currently infectious.
    fn rate(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.num_infectious as f64 / self.nodes.len() as f64
    }

    fn clone_box(&self) -> Box<dyn Disease> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seir(time_to_i: u16, time_to_r: u16, num_nodes: usize) -> Seir {
        Seir::new(
            SeirParams {
                time_to_i,
                time_to_r,
                infection_probability: 0.0,
                initial_infected: 0,
            },
            num_nodes,
        )
    }

    #[test]
    fn test_state() {
        let num_nodes = 10;
        let mut dis = seir(0, 0, num_nodes);
        assert_eq!(dis.nodes_in_state(Compartment::Susceptible).len(), num_nodes);

        dis.set_state(1, Compartment::Exposed).unwrap();
        dis.set_state(2, Compartment::Infectious).unwrap();
        dis.set_state(3, Compartment::Removed).unwrap();

        assert_eq!(dis.nodes_in_state(Compartment::Susceptible).len(), 7);
        assert_eq!(dis.nodes_in_state(Compartment::Exposed), vec![1]);
        assert_eq!(dis.nodes_in_state(Compartment::Infectious), vec![2]);
        assert_eq!(dis.nodes_in_state(Compartment::Removed), vec![3]);
    }

    #[test]
    fn test_set_state_resets_dwell() {
        let mut dis = seir(3, 3, 4);
        dis.tick();
        dis.tick();
        dis.increment_dwell(2).unwrap();
        assert_eq!(dis.dwell(2).unwrap(), 3);

        dis.set_state(2, Compartment::Exposed).unwrap();
        assert_eq!(dis.dwell(2).unwrap(), 0);
        assert_eq!(dis.dwell(1).unwrap(), 2);
    }

    #[test]
    fn test_out_of_range_node() {
        let mut dis = seir(1, 1, 3);
        assert_eq!(
            dis.set_state(3, Compartment::Infectious),
            Err(DiseaseError::NodeOutOfRange {
                node: 3,
                num_nodes: 3
            })
        );
        assert!(dis.report_caused_infections(7, 1).is_err());
        assert!(dis.state(3).is_err());
    }

    #[test]
    fn test_seir_advance_uses_equality() {
        let mut dis = seir(2, 1, 3);
        dis.set_state(0, Compartment::Exposed).unwrap();

        dis.advance();
        dis.tick();
        dis.advance();
        dis.tick();
        assert_eq!(dis.state(0).unwrap(), Compartment::Exposed);

        // Dwell is now 2
        dis.advance();
        assert_eq!(dis.state(0).unwrap(), Compartment::Infectious);
        assert_eq!(dis.dwell(0).unwrap(), 0);

        // Skipping past the threshold never transitions
        dis.tick();
        dis.tick();
        dis.advance();
        assert_eq!(dis.state(0).unwrap(), Compartment::Infectious);
    }

    #[test]
    fn test_seir_no_double_transition() {
        // Zero dwell thresholds: E -> I in one advance, but not on to R
        let mut dis = seir(0, 0, 1);
        dis.set_state(0, Compartment::Exposed).unwrap();
        dis.advance();
        assert_eq!(dis.state(0).unwrap(), Compartment::Infectious);
        dis.advance();
        assert_eq!(dis.state(0).unwrap(), Compartment::Removed);
        dis.advance();
        assert_eq!(dis.state(0).unwrap(), Compartment::Removed);
    }

    #[test]
    fn test_r0_zero_without_spreaders() {
        let dis = seir(1, 1, 5);
        let r0 = dis.basic_reproduction_number();
        assert_eq!(r0, 0.0);
        assert!(!r0.is_nan());
    }

    #[test]
    fn test_r0_averages_spreaders_only() {
        let mut dis = seir(1, 1, 5);
        dis.report_caused_infections(0, 3).unwrap();
        dis.report_caused_infections(4, 1).unwrap();
        dis.report_caused_infections(4, 1).unwrap();
        // (3 + 2) / 2 spreaders
        assert!((dis.basic_reproduction_number() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_clone_independent() {
        let original = seir(1, 2, 6);
        let mut a = original.clone();
        let mut b = original.clone();

        a.set_state(0, Compartment::Infectious).unwrap();
        a.report_caused_infections(0, 2).unwrap();
        b.tick();

        assert_eq!(original.state(0).unwrap(), Compartment::Susceptible);
        assert_eq!(original.dwell(0).unwrap(), 0);
        assert_eq!(original.basic_reproduction_number(), 0.0);
        assert_eq!(b.state(0).unwrap(), Compartment::Susceptible);
        assert_eq!(a.dwell(1).unwrap(), 0);
        assert_eq!(b.dwell(1).unwrap(), 1);
        assert!(std::sync::Arc::ptr_eq(&a.params, &b.params));
    }

    #[test]
    fn test_boxed_clone_independent() {
        let template: Box<dyn Disease> = instantiate(&DiseaseSpec::default(), 4);
        let mut copy = template.clone();
        copy.set_state(1, Compartment::Removed).unwrap();
        assert_eq!(template.state(1).unwrap(), Compartment::Susceptible);
        assert_eq!(copy.state(1).unwrap(), Compartment::Removed);
        assert_eq!(copy.kind(), DiseaseKind::Seir);
    }

    #[test]
    fn test_seir_rate_is_susceptible_fraction() {
        let mut dis = seir(1, 1, 4);
        dis.set_state(0, Compartment::Removed).unwrap();
        assert!((dis.rate() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_sirs_cycle() {
        let mut dis = Sirs::new(
            SirsParams {
                time_to_r: 1,
                time_to_s: 2,
                infection_probability: 1.0,
                initial_infected: 1,
            },
            4,
        );
        assert_eq!(dis.infection_target(), Compartment::Infectious);

        dis.set_state(0, Compartment::Infectious).unwrap();
        dis.set_state(1, Compartment::Infectious).unwrap();
        assert_eq!(dis.num_infectious(), 2);
        assert!((dis.rate() - 0.5).abs() < 1e-12);

        // Re-setting an infectious node does not double count
        dis.set_state(1, Compartment::Infectious).unwrap();
        assert_eq!(dis.num_infectious(), 2);

        dis.tick();
        dis.advance();
        assert_eq!(dis.nodes_in_state(Compartment::Removed), vec![0, 1]);
        assert_eq!(dis.num_infectious(), 0);

        dis.tick();
        dis.advance();
        assert_eq!(dis.count_removed(), 2);
        dis.tick();
        dis.advance();
        assert_eq!(dis.nodes_in_state(Compartment::Susceptible).len(), 4);
        assert!(dis.is_quiescent());
    }

    #[test]
    fn test_sirs_count_tracks_manual_transitions() {
        let mut dis = Sirs::new(
            SirsParams {
                time_to_r: 5,
                time_to_s: 5,
                infection_probability: 0.5,
                initial_infected: 1,
            },
            3,
        );
        dis.set_state(2, Compartment::Infectious).unwrap();
        dis.set_state(2, Compartment::Susceptible).unwrap();
        assert_eq!(dis.num_infectious(), 0);
    }

    impl Sirs {
        fn count_removed(&self) -> usize {
            self.nodes.count(Compartment::Removed)
        }
    }
}
