//! Cooperation field — derived per-agent force vectors.
//!
//! The field is fully recomputed each tick from the registry and graph,
//! never patched incrementally, so it cannot drift. Consumers read it;
//! nothing writes to it except `recompute`.

use crate::config::MeshConfig;
use crate::registry::AgentRegistry;
use conflux_core::topology::InteractionGraph;
use conflux_core::types::{AgentId, ForceVector};
use std::collections::HashMap;

/// Current force vector per agent.
pub struct CooperationField {
    forces: HashMap<AgentId, ForceVector>,
}

impl CooperationField {
    pub fn new() -> Self {
        Self {
            forces: HashMap::new(),
        }
    }

    /// Recompute every agent's force vector.
    ///
    /// For agent A the force is the sum over graph neighbors B of
    /// `weight(A,B) * unit(pos(B) - pos(A)) * cooperation_constant`, minus a
    /// repulsion term when B sits closer than the minimum separation.
    pub fn recompute(
        &mut self,
        registry: &AgentRegistry,
        graph: &dyn InteractionGraph,
        cfg: &MeshConfig,
    ) {
        self.forces.clear();

        for agent in registry.iter() {
            let mut force = ForceVector::ZERO;
            for (neighbor_id, edge) in graph.neighbors(&agent.id) {
                let Some(neighbor) = registry.get(&neighbor_id) else {
                    continue;
                };
                let dx = neighbor.position.x - agent.position.x;
                let dy = neighbor.position.y - agent.position.y;
                let dz = neighbor.position.z - agent.position.z;
                let dist = (dx * dx + dy * dy + dz * dz).sqrt();
                if dist < f64::EPSILON {
                    continue;
                }
                let (ux, uy, uz) = (dx / dist, dy / dist, dz / dist);

                let pull = edge.weight * cfg.cooperation_constant;
                force.x += ux * pull;
                force.y += uy * pull;
                force.z += uz * pull;

                if dist < cfg.min_separation {
                    let push =
                        cfg.repulsion_constant * (cfg.min_separation - dist) / cfg.min_separation;
                    force.x -= ux * push;
                    force.y -= uy * push;
                    force.z -= uz * push;
                }
            }
            self.forces.insert(agent.id, force);
        }
    }

    /// The current force on an agent. Zero for unknown agents.
    pub fn force(&self, id: &AgentId) -> ForceVector {
        self.forces.get(id).copied().unwrap_or(ForceVector::ZERO)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.forces.contains_key(id)
    }

    /// Drop an agent's entry (used by the removal cascade).
    pub fn remove(&mut self, id: &AgentId) {
        self.forces.remove(id);
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }
}

impl Default for CooperationField {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative affinity between two agents, in [0, 1].
///
/// Edge weight attenuated by spatial distance; zero when the agents are
/// unconnected or either is unregistered. Used by the engine to rank
/// candidates and weight consensus.
pub fn affinity(
    registry: &AgentRegistry,
    graph: &dyn InteractionGraph,
    a: &AgentId,
    b: &AgentId,
) -> f64 {
    let Some(edge) = graph.get_edge(a, b) else {
        return 0.0;
    };
    let (Some(agent_a), Some(agent_b)) = (registry.get(a), registry.get(b)) else {
        return 0.0;
    };
    let dist = agent_a.position.distance_to(&agent_b.position);
    edge.weight / (1.0 + dist)
}
