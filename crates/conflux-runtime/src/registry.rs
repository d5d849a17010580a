//! Agent registry — the canonical store of agent identity and state.
//!
//! Every other component references agents by identifier and resolves them
//! here. Removal elsewhere (graph, perturbations, field, engine) is driven
//! by the mesh after `remove` succeeds, so this is the single choke point
//! for teardown.

use crate::config::MeshConfig;
use crate::rng;
use conflux_core::error::{ConfigError, ConfluxError, Result};
use conflux_core::types::{Agent, AgentConfig, AgentId, AgentStatus, Position, Tick};
use std::collections::HashMap;

/// Canonical store of agents, keyed by id.
pub struct AgentRegistry {
    agents: HashMap<AgentId, Agent>,
    rng_state: u64,
}

impl AgentRegistry {
    pub fn new(seed: u64) -> Self {
        Self {
            agents: HashMap::new(),
            rng_state: seed,
        }
    }

    /// Register a new agent with validated defaults.
    ///
    /// Fails with `InvalidConfig` if the capability set is empty, a supplied
    /// position has non-finite components, or the supplied energy is outside
    /// [0, max]. Nothing is stored on failure.
    pub fn register(&mut self, config: AgentConfig, cfg: &MeshConfig, tick: Tick) -> Result<AgentId> {
        if config.capabilities.is_empty() {
            return Err(ConfluxError::empty_capabilities());
        }
        if let Some(pos) = &config.position {
            if !pos.is_finite() {
                return Err(ConfluxError::InvalidConfig(ConfigError::NonFinitePosition));
            }
        }
        if let Some(energy) = config.energy {
            if !(0.0..=cfg.max_energy).contains(&energy) {
                return Err(ConfluxError::InvalidConfig(ConfigError::OutOfRange {
                    field: "energy".to_string(),
                    min: 0.0,
                    max: cfg.max_energy,
                    value: energy,
                }));
            }
        }

        let position = config.position.unwrap_or_else(|| self.random_position(cfg));
        let energy = config.energy.unwrap_or(cfg.max_energy);
        let id = AgentId::new();
        let agent = Agent {
            id,
            name: config.name,
            agent_type: config.agent_type,
            capabilities: config.capabilities.into_iter().collect(),
            position,
            energy,
            status: if energy < cfg.low_energy_threshold {
                AgentStatus::Depleted
            } else {
                AgentStatus::Idle
            },
            last_updated: tick,
        };
        self.agents.insert(id, agent);
        Ok(id)
    }

    /// Remove an agent. Returns the removed record, or `None` if the id is
    /// absent — callers treat absence as a signal, not a fault.
    pub fn remove(&mut self, id: &AgentId) -> Option<Agent> {
        self.agents.remove(id)
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// All agent ids, sorted for deterministic iteration.
    pub fn sorted_ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Adjust an agent's energy by `delta`, clamped to [0, max].
    ///
    /// Crossing below the low threshold sets the agent Depleted; restoring
    /// above it brings a Depleted agent back to Idle. Returns the new level.
    pub fn adjust_energy(
        &mut self,
        id: &AgentId,
        delta: f64,
        cfg: &MeshConfig,
        tick: Tick,
    ) -> Result<f64> {
        let agent = self
            .agents
            .get_mut(id)
            .ok_or(ConfluxError::agent_not_found(*id))?;
        agent.energy = (agent.energy + delta).clamp(0.0, cfg.max_energy);
        if agent.energy < cfg.low_energy_threshold {
            agent.status = AgentStatus::Depleted;
        } else if agent.status == AgentStatus::Depleted {
            agent.status = AgentStatus::Idle;
        }
        agent.last_updated = tick;
        Ok(agent.energy)
    }

    /// Set an agent's status, stamping `last_updated`.
    pub fn set_status(&mut self, id: &AgentId, status: AgentStatus, tick: Tick) {
        if let Some(agent) = self.agents.get_mut(id) {
            agent.status = status;
            agent.last_updated = tick;
        }
    }

    /// Move an agent toward a target position by `step`.
    pub fn nudge_toward(&mut self, id: &AgentId, target: &Position, step: f64, tick: Tick) {
        if let Some(agent) = self.agents.get_mut(id) {
            agent.position.nudge_toward(target, step);
            agent.last_updated = tick;
        }
    }

    fn random_position(&mut self, cfg: &MeshConfig) -> Position {
        let b = cfg.field_bounds;
        let x = (rng::next_unit(&mut self.rng_state) * 2.0 - 1.0) * b;
        let y = (rng::next_unit(&mut self.rng_state) * 2.0 - 1.0) * b;
        let z = (rng::next_unit(&mut self.rng_state) * 2.0 - 1.0) * b;
        Position::new(x, y, z)
    }
}
