//! Synthetic network generators.

use super::{Network, NodeId};
use crate::schema::NetworkSource;

/// Complete graph: every pair of distinct nodes is connected.
pub fn complete(num_nodes: usize) -> Network {
    let mut network = Network::new(num_nodes);
    for i in 0..num_nodes {
        for j in (i + 1)..num_nodes {
            network.link(i, j, 1);
        }
    }
    network
}

/// Ring: node `i` is connected to `i + 1 (mod n)`.
pub fn ring(num_nodes: usize) -> Network {
    let mut network = Network::new(num_nodes);
    for i in 0..num_nodes {
        let j = (i + 1) % num_nodes;
        if i != j {
            network.link(i, j, 1);
        }
    }
    network
}

/// Clique-gate graph.
///
/// `components` complete components of `component_size` nodes are joined
/// pairwise by complete "gate" cliques of `gate_size` nodes. The first half
/// of a gate attaches one-to-one to the lower-indexed component, the second
/// half to the higher-indexed one. Gate nodes are numbered first.
pub fn clique_gate(components: usize, component_size: usize, gate_size: usize) -> Network {
    let num_gates = components * components.saturating_sub(1) / 2;
    let gate_nodes = num_gates * gate_size;
    let num_nodes = gate_nodes + components * component_size;
    let mut network = Network::new(num_nodes);

    let gate = |g: usize| (g * gate_size)..((g + 1) * gate_size);
    let component = |c: usize| {
        let start = gate_nodes + c * component_size;
        start..(start + component_size)
    };

    for g in 0..num_gates {
        connect_all(&mut network, gate(g));
    }
    for c in 0..components {
        connect_all(&mut network, component(c));
    }

    let mut next_gate = 0;
    for src in 0..components {
        for dest in (src + 1)..components {
            let members: Vec<NodeId> = gate(next_gate).collect();
            next_gate += 1;

            let (front, back) = members.split_at(members.len() / 2);
            for (&g, s) in front.iter().zip(component(src)) {
                network.link(g, s, 1);
            }
            for (&g, d) in back.iter().zip(component(dest)) {
                network.link(g, d, 1);
            }
        }
    }

    network
}

fn connect_all(network: &mut Network, nodes: std::ops::Range<NodeId>) {
    for i in nodes.clone() {
        for j in (i + 1)..nodes.end {
            network.link(i, j, 1);
        }
    }
}

/// Build a generated network. Returns `None` for file-backed sources.
pub fn from_source(source: &NetworkSource) -> Option<Network> {
    match *source {
        NetworkSource::Complete { nodes } => Some(complete(nodes)),
        NetworkSource::Ring { nodes } => Some(ring(nodes)),
        NetworkSource::CliqueGate {
            components,
            component_size,
            gate_size,
        } => Some(clique_gate(components, component_size, gate_size)),
        NetworkSource::EdgeList { .. } => None,
    }
}
