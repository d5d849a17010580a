//! Interaction graph — the weighted topology over agents.
//!
//! Edges are identifier pairs into the registry, never object links, so
//! removing an agent is a pure lookup/delete.

use crate::types::{AgentId, EdgeData};

/// A handle to the interaction graph over agent identifiers.
///
/// This is a trait rather than a concrete type so that different runtime
/// implementations can use different graph backends.
pub trait InteractionGraph {
    /// Add a node for an agent. No-op if it already exists.
    fn add_node(&mut self, id: AgentId);

    /// Remove a node and all incident edges atomically.
    /// Returns the removed edges as (neighbor, data) pairs, or `None` if the
    /// node was absent.
    fn remove_node(&mut self, id: &AgentId) -> Option<Vec<(AgentId, EdgeData)>>;

    /// Whether an agent has a node in the graph.
    fn contains(&self, id: &AgentId) -> bool;

    /// Add or update the edge between two agents. If the edge exists, the
    /// data is replaced — never duplicated.
    fn upsert_edge(&mut self, a: AgentId, b: AgentId, data: EdgeData);

    /// Get edge data for an unordered pair.
    fn get_edge(&self, a: &AgentId, b: &AgentId) -> Option<&EdgeData>;

    /// Get mutable edge data for an unordered pair.
    fn get_edge_mut(&mut self, a: &AgentId, b: &AgentId) -> Option<&mut EdgeData>;

    /// Remove an edge. Returns the removed data if it existed.
    fn remove_edge(&mut self, a: &AgentId, b: &AgentId) -> Option<EdgeData>;

    /// All neighbors of an agent with their edge data.
    fn neighbors(&self, id: &AgentId) -> Vec<(AgentId, &EdgeData)>;

    /// Number of edges incident to an agent.
    fn degree(&self, id: &AgentId) -> usize;

    /// All node IDs.
    fn all_nodes(&self) -> Vec<AgentId>;

    /// All edges as (a, b, data) triples.
    fn all_edges(&self) -> Vec<(AgentId, AgentId, &EdgeData)>;

    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of edges.
    fn edge_count(&self) -> usize;
}
