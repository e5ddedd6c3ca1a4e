//! Behavioral rewiring of the contact network.
//!
//! A step's rewiring is planned entirely against the pre-step topology and
//! then applied in two passes: every addition first, every removal second.
//! An edge that lands in both sets is therefore absent afterwards.

use log::warn;
use rand::Rng;
use rand::rngs::StdRng;

use super::{Compartment, Network, NetworkError, NodeId};
use crate::schema::{AgentBehavior, DegreePolicy};

/// Edge operations drawn for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewirePlan {
    pub additions: Vec<(NodeId, NodeId)>,
    pub removals: Vec<(NodeId, NodeId)>,
}

impl RewirePlan {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// What actually changed when a plan was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewireSummary {
    /// Edges created.
    pub added: usize,
    /// Edges deleted.
    pub removed: usize,
    /// Operations skipped by the degree-bound policy.
    pub suppressed: usize,
}

/// Draw the rewiring operations for every node.
///
/// `states` are the primary disease's compartments; only Infectious
/// neighbors are candidates for removal.
pub fn plan(
    network: &Network,
    states: &[Compartment],
    behavior: &AgentBehavior,
    rng: &mut StdRng,
) -> Result<RewirePlan, NetworkError> {
    let add_prob = behavior.add_neighbor_of_neighbor_prob;
    let remove_prob = behavior.remove_infected_neighbor_prob;
    let mut plan = RewirePlan::default();

    for node in 0..network.num_nodes() {
        for (neighbor, _) in network.neighbors(node)? {
            if add_prob > 0.0 {
                for (candidate, _) in network.neighbors(neighbor)? {
                    if rng.r#gen::<f32>() < add_prob {
                        plan.additions.push((node, candidate));
                    }
                }
            }
            let infectious = states.get(neighbor) == Some(&Compartment::Infectious);
            if infectious && rng.r#gen::<f32>() < remove_prob {
                plan.removals.push((node, neighbor));
            }
        }
    }

    Ok(plan)
}

/// Apply a plan: additions, then removals.
pub fn apply(
    plan: &RewirePlan,
    network: &mut Network,
    behavior: &AgentBehavior,
    policy: DegreePolicy,
) -> Result<RewireSummary, NetworkError> {
    let enforce = policy == DegreePolicy::Enforce;
    let mut summary = RewireSummary::default();

    for &(a, b) in &plan.additions {
        if a == b || network.has_edge(a, b)? {
            continue;
        }
        if enforce
            && (network.degree(a)? >= behavior.max_connections
                || network.degree(b)? >= behavior.max_connections)
        {
            summary.suppressed += 1;
            continue;
        }
        network.add_edge(a, b, 1)?;
        summary.added += 1;
    }

    for &(a, b) in &plan.removals {
        if !network.has_edge(a, b)? {
            continue;
        }
        if enforce
            && (network.degree(a)? <= behavior.min_connections
                || network.degree(b)? <= behavior.min_connections)
        {
            summary.suppressed += 1;
            continue;
        }
        network.remove_edge(a, b)?;
        summary.removed += 1;
    }

    if summary.suppressed > 0 {
        warn!(
            "Degree bounds [{}, {}] suppressed {} rewiring operations",
            behavior.min_connections, behavior.max_connections, summary.suppressed
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn triangle_states() -> Vec<Compartment> {
        vec![
            Compartment::Susceptible,
            Compartment::Susceptible,
            Compartment::Infectious,
        ]
    }

    #[test]
    fn test_removal_wins_over_addition() {
        let mut net = Network::from_edges(3, [(0, 1), (1, 2), (0, 2)]).unwrap();
        let behavior = AgentBehavior::new(0, usize::MAX, 1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(0);

        let plan = plan(&net, &triangle_states(), &behavior, &mut rng).unwrap();
        assert!(plan.additions.contains(&(0, 2)));
        assert!(plan.removals.contains(&(0, 2)));

        apply(&plan, &mut net, &behavior, DegreePolicy::Ignore).unwrap();
        assert!(!net.has_edge(0, 2).unwrap());
        assert!(!net.has_edge(1, 2).unwrap());
        assert!(net.has_edge(0, 1).unwrap());
    }

    #[test]
    fn test_plan_reads_pre_step_topology() {
        // Path 0-1-2-3: only distance-two pairs can be proposed
        let net = Network::from_edges(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        let behavior = AgentBehavior::new(0, usize::MAX, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(0);

        let plan = plan(&net, &[Compartment::Susceptible; 4], &behavior, &mut rng).unwrap();
        assert!(plan.removals.is_empty());
        assert!(plan.additions.contains(&(0, 2)));
        assert!(!plan.additions.contains(&(0, 3)));
    }

    #[test]
    fn test_no_rewiring_at_zero_probability() {
        let net = Network::from_edges(3, [(0, 1), (1, 2), (0, 2)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let plan = plan(&net, &triangle_states(), &AgentBehavior::default(), &mut rng).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_self_pairs_skipped() {
        let mut net = Network::from_edges(2, [(0, 1)]).unwrap();
        let behavior = AgentBehavior::new(0, usize::MAX, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(0);

        let plan = plan(&net, &[Compartment::Susceptible; 2], &behavior, &mut rng).unwrap();
        // Each node's neighbor lists the node itself
        assert!(plan.additions.contains(&(0, 0)));

        let summary = apply(&plan, &mut net, &behavior, DegreePolicy::Enforce).unwrap();
        assert_eq!(summary.added, 0);
        assert_eq!(net.num_edges(), 1);
    }

    #[test]
    fn test_max_connections_enforced() {
        // Star around node 0; closing the triangles would raise leaf degrees to 4
        let mut net = Network::from_edges(5, [(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let behavior = AgentBehavior::new(0, 2, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(0);

        let plan = plan(&net, &[Compartment::Susceptible; 5], &behavior, &mut rng).unwrap();
        let summary = apply(&plan, &mut net, &behavior, DegreePolicy::Enforce).unwrap();
        for node in 1..5 {
            assert!(net.degree(node).unwrap() <= 2);
        }
        assert!(summary.suppressed > 0);
        assert_eq!(net.degree(0).unwrap(), 4);
    }

    #[test]
    fn test_min_connections_enforced() {
        let mut net = Network::from_edges(3, [(0, 1), (1, 2), (0, 2)]).unwrap();
        let behavior = AgentBehavior::new(2, usize::MAX, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let plan = plan(&net, &triangle_states(), &behavior, &mut rng).unwrap();
        let summary = apply(&plan, &mut net, &behavior, DegreePolicy::Enforce).unwrap();
        assert_eq!(summary.removed, 0);
        assert_eq!(net.num_edges(), 3);

        let summary = apply(&plan, &mut net, &behavior, DegreePolicy::Ignore).unwrap();
        assert_eq!(summary.removed, 2);
    }
}
