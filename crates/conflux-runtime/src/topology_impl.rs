//! Concrete implementation of the InteractionGraph trait using petgraph.
//!
//! Uses petgraph's undirected `Graph` as the backing store with a HashMap
//! index for O(1) node lookup by agent id.

use conflux_core::topology::InteractionGraph;
use conflux_core::types::{AgentId, EdgeData};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Petgraph-backed implementation of the interaction graph.
pub struct PetInteractionGraph {
    graph: Graph<AgentId, EdgeData, petgraph::Undirected>,
    /// Map from agent id to petgraph's internal index.
    node_index: HashMap<AgentId, NodeIndex>,
}

impl PetInteractionGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
            node_index: HashMap::new(),
        }
    }
}

impl Default for PetInteractionGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionGraph for PetInteractionGraph {
    fn add_node(&mut self, id: AgentId) {
        if self.node_index.contains_key(&id) {
            return;
        }
        let idx = self.graph.add_node(id);
        self.node_index.insert(id, idx);
    }

    fn remove_node(&mut self, id: &AgentId) -> Option<Vec<(AgentId, EdgeData)>> {
        let idx = self.node_index.remove(id)?;

        let removed: Vec<(AgentId, EdgeData)> = self
            .graph
            .edges(idx)
            .map(|edge| {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (self.graph[other], edge.weight().clone())
            })
            .collect();

        self.graph.remove_node(idx);
        // petgraph swaps the last node into the freed slot; repair its index.
        if let Some(&moved) = self.graph.node_weight(idx) {
            self.node_index.insert(moved, idx);
        }

        Some(removed)
    }

    fn contains(&self, id: &AgentId) -> bool {
        self.node_index.contains_key(id)
    }

    fn upsert_edge(&mut self, a: AgentId, b: AgentId, data: EdgeData) {
        let Some(&a_idx) = self.node_index.get(&a) else {
            return;
        };
        let Some(&b_idx) = self.node_index.get(&b) else {
            return;
        };
        if let Some(edge_idx) = self.graph.find_edge(a_idx, b_idx) {
            self.graph[edge_idx] = data;
        } else {
            self.graph.add_edge(a_idx, b_idx, data);
        }
    }

    fn get_edge(&self, a: &AgentId, b: &AgentId) -> Option<&EdgeData> {
        let a_idx = self.node_index.get(a)?;
        let b_idx = self.node_index.get(b)?;
        let edge_idx = self.graph.find_edge(*a_idx, *b_idx)?;
        Some(&self.graph[edge_idx])
    }

    fn get_edge_mut(&mut self, a: &AgentId, b: &AgentId) -> Option<&mut EdgeData> {
        let a_idx = *self.node_index.get(a)?;
        let b_idx = *self.node_index.get(b)?;
        let edge_idx = self.graph.find_edge(a_idx, b_idx)?;
        Some(&mut self.graph[edge_idx])
    }

    fn remove_edge(&mut self, a: &AgentId, b: &AgentId) -> Option<EdgeData> {
        let a_idx = *self.node_index.get(a)?;
        let b_idx = *self.node_index.get(b)?;
        let edge_idx = self.graph.find_edge(a_idx, b_idx)?;
        self.graph.remove_edge(edge_idx)
    }

    fn neighbors(&self, id: &AgentId) -> Vec<(AgentId, &EdgeData)> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges(idx)
            .map(|edge| {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (self.graph[other], edge.weight())
            })
            .collect()
    }

    fn degree(&self, id: &AgentId) -> usize {
        self.node_index
            .get(id)
            .map(|&idx| self.graph.edges(idx).count())
            .unwrap_or(0)
    }

    fn all_nodes(&self) -> Vec<AgentId> {
        self.graph.node_indices().map(|idx| self.graph[idx]).collect()
    }

    fn all_edges(&self) -> Vec<(AgentId, AgentId, &EdgeData)> {
        self.graph
            .edge_indices()
            .map(|idx| {
                let (a, b) = self.graph.edge_endpoints(idx).expect("edge has endpoints");
                (self.graph[a], self.graph[b], &self.graph[idx])
            })
            .collect()
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflux_core::types::ConnectionKind;

    fn edge(weight: f64) -> EdgeData {
        EdgeData {
            weight,
            kind: ConnectionKind::Initial,
            created_tick: 0,
        }
    }

    #[test]
    fn upsert_replaces_instead_of_duplicating() {
        let mut g = PetInteractionGraph::new();
        let a = AgentId::from_seed(1);
        let b = AgentId::from_seed(2);
        g.add_node(a);
        g.add_node(b);
        g.upsert_edge(a, b, edge(0.3));
        g.upsert_edge(b, a, edge(0.9));
        assert_eq!(g.edge_count(), 1);
        assert!((g.get_edge(&a, &b).unwrap().weight - 0.9).abs() < 1e-12);
    }

    #[test]
    fn remove_node_cascades_edges() {
        let mut g = PetInteractionGraph::new();
        let ids: Vec<AgentId> = (0..4).map(AgentId::from_seed).collect();
        for &id in &ids {
            g.add_node(id);
        }
        g.upsert_edge(ids[0], ids[1], edge(0.5));
        g.upsert_edge(ids[0], ids[2], edge(0.5));
        g.upsert_edge(ids[1], ids[2], edge(0.5));

        let removed = g.remove_node(&ids[0]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 1);
        for (a, b, _) in g.all_edges() {
            assert_ne!(a, ids[0]);
            assert_ne!(b, ids[0]);
        }
    }

    #[test]
    fn remove_node_is_idempotent_safe() {
        let mut g = PetInteractionGraph::new();
        let a = AgentId::from_seed(1);
        g.add_node(a);
        assert!(g.remove_node(&a).is_some());
        assert!(g.remove_node(&a).is_none());
    }

    #[test]
    fn index_survives_petgraph_swap_remove() {
        let mut g = PetInteractionGraph::new();
        let ids: Vec<AgentId> = (0..5).map(AgentId::from_seed).collect();
        for &id in &ids {
            g.add_node(id);
        }
        g.upsert_edge(ids[3], ids[4], edge(0.5));

        // Removing an early node makes petgraph swap the last node into its
        // slot; lookups on the moved node must still work.
        g.remove_node(&ids[0]);
        assert!(g.contains(&ids[4]));
        assert!(g.get_edge(&ids[3], &ids[4]).is_some());
        assert_eq!(g.neighbors(&ids[4]).len(), 1);
    }

    #[test]
    fn neighbors_and_degree_agree() {
        let mut g = PetInteractionGraph::new();
        let ids: Vec<AgentId> = (0..3).map(AgentId::from_seed).collect();
        for &id in &ids {
            g.add_node(id);
        }
        g.upsert_edge(ids[0], ids[1], edge(0.2));
        g.upsert_edge(ids[0], ids[2], edge(0.4));
        assert_eq!(g.degree(&ids[0]), 2);
        assert_eq!(g.neighbors(&ids[0]).len(), 2);
        assert_eq!(g.degree(&ids[1]), 1);
    }
}
