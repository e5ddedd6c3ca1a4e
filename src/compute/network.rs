//! Undirected weighted contact network over a fixed node universe.

use std::collections::BTreeMap;

/// Node identifier in `0..num_nodes`.
pub type NodeId = usize;

/// Edge weight. Zero means "no edge".
pub type Weight = u8;

/// Network access errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("Node {node} is out of range for a network of {num_nodes} nodes")]
    NodeOutOfRange { node: NodeId, num_nodes: usize },
}

/// Undirected graph with symmetric weights.
///
/// Storage is one ordered neighbor map per node, sized at construction.
/// Every accessor bounds-checks its node ids; the node set never grows.
/// `Clone` is a deep copy of the adjacency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    adjacency: Vec<BTreeMap<NodeId, Weight>>,
}

impl Network {
    /// Create a network of `num_nodes` isolated nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            adjacency: vec![BTreeMap::new(); num_nodes],
        }
    }

    /// Build a network from unit-weight edges.
    pub fn from_edges<I>(num_nodes: usize, edges: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut network = Self::new(num_nodes);
        for (a, b) in edges {
            network.add_edge(a, b, 1)?;
        }
        Ok(network)
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges (a self-loop counts once).
    pub fn num_edges(&self) -> usize {
        let mut loops = 0;
        let mut ends = 0;
        for (node, neighbors) in self.adjacency.iter().enumerate() {
            ends += neighbors.len();
            if neighbors.contains_key(&node) {
                loops += 1;
            }
        }
        (ends - loops) / 2 + loops
    }

    #[inline]
    fn check(&self, node: NodeId) -> Result<(), NetworkError> {
        if node < self.adjacency.len() {
            Ok(())
        } else {
            Err(NetworkError::NodeOutOfRange {
                node,
                num_nodes: self.adjacency.len(),
            })
        }
    }

    /// Neighbors of `node` with edge weights, in ascending id order.
    pub fn neighbors(
        &self,
        node: NodeId,
    ) -> Result<impl Iterator<Item = (NodeId, Weight)> + '_, NetworkError> {
        self.check(node)?;
        Ok(self.adjacency[node].iter().map(|(&n, &w)| (n, w)))
    }

    pub fn degree(&self, node: NodeId) -> Result<usize, NetworkError> {
        self.check(node)?;
        Ok(self.adjacency[node].len())
    }

    /// Weight of the edge between `a` and `b`, or 0 if absent.
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Result<Weight, NetworkError> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.adjacency[a].get(&b).copied().unwrap_or(0))
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> Result<bool, NetworkError> {
        Ok(self.edge_weight(a, b)? > 0)
    }

    /// Insert or update the edge `a`–`b`. A zero weight removes it.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: Weight) -> Result<(), NetworkError> {
        self.check(a)?;
        self.check(b)?;
        if weight == 0 {
            self.unlink(a, b);
        } else {
            self.link(a, b, weight);
        }
        Ok(())
    }

    /// Remove the edge `a`–`b`; no-op if absent.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), NetworkError> {
        self.check(a)?;
        self.check(b)?;
        self.unlink(a, b);
        Ok(())
    }

    /// All edges as `(low, high, weight)`, sorted.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, Weight)> {
        let mut edges = Vec::with_capacity(self.num_edges());
        for (a, neighbors) in self.adjacency.iter().enumerate() {
            for (&b, &w) in neighbors.range(a..) {
                edges.push((a, b, w));
            }
        }
        edges
    }

    /// Mean node degree.
    pub fn mean_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        let total: usize = self.adjacency.iter().map(|n| n.len()).sum();
        total as f64 / self.adjacency.len() as f64
    }

    /// Unchecked symmetric insert for callers that own the id range.
    #[inline]
    pub(crate) fn link(&mut self, a: NodeId, b: NodeId, weight: Weight) {
        self.adjacency[a].insert(b, weight);
        self.adjacency[b].insert(a, weight);
    }

    #[inline]
    fn unlink(&mut self, a: NodeId, b: NodeId) {
        self.adjacency[a].remove(&b);
        self.adjacency[b].remove(&a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_symmetric() {
        let mut net = Network::new(3);
        net.add_edge(0, 2, 4).unwrap();
        assert_eq!(net.edge_weight(0, 2).unwrap(), 4);
        assert_eq!(net.edge_weight(2, 0).unwrap(), 4);
        assert_eq!(net.edge_weight(0, 1).unwrap(), 0);
        assert_eq!(net.num_edges(), 1);
    }

    #[test]
    fn test_add_is_upsert() {
        let mut net = Network::new(2);
        net.add_edge(0, 1, 1).unwrap();
        net.add_edge(1, 0, 7).unwrap();
        assert_eq!(net.edge_weight(0, 1).unwrap(), 7);
        assert_eq!(net.degree(0).unwrap(), 1);
    }

    #[test]
    fn test_remove_idempotent() {
        let mut net = Network::from_edges(3, [(0, 1), (1, 2)]).unwrap();
        net.remove_edge(1, 0).unwrap();
        net.remove_edge(0, 1).unwrap();
        assert!(!net.has_edge(0, 1).unwrap());
        assert!(net.has_edge(2, 1).unwrap());
        assert_eq!(net.num_edges(), 1);
    }

    #[test]
    fn test_zero_weight_removes() {
        let mut net = Network::from_edges(2, [(0, 1)]).unwrap();
        net.add_edge(0, 1, 0).unwrap();
        assert_eq!(net.num_edges(), 0);
    }

    #[test]
    fn test_out_of_range_fails() {
        let mut net = Network::new(4);
        let err = net.add_edge(1, 4, 1).unwrap_err();
        assert_eq!(
            err,
            NetworkError::NodeOutOfRange {
                node: 4,
                num_nodes: 4
            }
        );
        assert!(net.remove_edge(9, 0).is_err());
        assert!(net.neighbors(4).is_err());
        assert!(net.edge_weight(0, 4).is_err());
        // Nothing was created by the failed calls
        assert_eq!(net.num_nodes(), 4);
        assert_eq!(net.num_edges(), 0);
    }

    #[test]
    fn test_clone_independent() {
        let original = Network::from_edges(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        let mut a = original.clone();
        let mut b = original.clone();

        a.remove_edge(0, 1).unwrap();
        b.add_edge(0, 3, 1).unwrap();

        assert!(original.has_edge(0, 1).unwrap());
        assert!(!original.has_edge(0, 3).unwrap());
        assert!(!a.has_edge(0, 1).unwrap());
        assert!(!a.has_edge(0, 3).unwrap());
        assert!(b.has_edge(0, 1).unwrap());
        assert!(b.has_edge(0, 3).unwrap());
    }

    #[test]
    fn test_edges_listed_once() {
        let net = Network::from_edges(3, [(2, 0), (1, 0), (1, 1)]).unwrap();
        assert_eq!(net.edges(), vec![(0, 1, 1), (0, 2, 1), (1, 1, 1)]);
        assert_eq!(net.num_edges(), 3);
    }

    #[test]
    fn test_neighbors_sorted() {
        let net = Network::from_edges(5, [(2, 4), (2, 0), (2, 3)]).unwrap();
        let ids: Vec<_> = net.neighbors(2).unwrap().map(|(n, _)| n).collect();
        assert_eq!(ids, vec![0, 3, 4]);
        assert!((net.mean_degree() - 6.0 / 5.0).abs() < 1e-9);
    }
}
