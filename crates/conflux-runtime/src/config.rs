//! Configuration for mesh simulation parameters.

use serde::{Deserialize, Serialize};

/// Tunable parameters for the mesh.
///
/// Every numeric threshold the simulation uses lives here so that callers
/// can override the illustrative defaults. Use with `Mesh::from_config()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Maximum agent energy (default: 100.0).
    pub max_energy: f64,
    /// Energy below which an agent is Depleted (default: 20.0).
    pub low_energy_threshold: f64,
    /// Energy restored to non-working agents per health check (default: 5.0).
    pub energy_restore_per_check: f64,
    /// Ticks between health checks (default: 10).
    pub health_check_interval: u64,
    /// Random positions are drawn from [-field_bounds, field_bounds]³ (default: 100.0).
    pub field_bounds: f64,

    /// Multiplicative per-tick perturbation decay, in (0, 1) (default: 0.9).
    pub perturbation_decay: f64,
    /// Strength below which a perturbation is retired (default: 0.01).
    pub perturbation_floor: f64,
    /// Position nudge per tick = strength * this (default: 0.1).
    pub perturbation_position_step: f64,
    /// Energy delta per tick = kind sign * strength * this (default: 1.0).
    pub perturbation_energy_scale: f64,

    /// Global cooperation constant scaling attractive forces (default: 0.1).
    pub cooperation_constant: f64,
    /// Minimum allowed separation before repulsion kicks in (default: 1.0).
    pub min_separation: f64,
    /// Repulsion scale for agents below minimum separation (default: 0.5).
    pub repulsion_constant: f64,

    /// Stability score below which restructuring triggers (default: 0.3).
    pub stability_cutoff: f64,
    /// Fraction of a hub's weakest edges dropped per restructure (default: 0.25).
    pub restructure_drop_fraction: f64,
    /// Number of highest-degree nodes treated as overloaded hubs (default: 3).
    pub restructure_hub_count: usize,
    /// Weight range for edges created by restructuring (defaults: 0.4-0.7).
    pub new_edge_weight_min: f64,
    pub new_edge_weight_max: f64,
    /// Total edges are capped at this multiple of the node count (default: 4).
    pub edge_cap_multiple: usize,

    /// Consensus score at which a parallel task converges (default: 0.8).
    pub consensus_threshold: f64,
    /// Base per-tick progress for an active worker (default: 0.2).
    pub base_progress_rate: f64,
    /// Base per-tick energy drain for an active worker (default: 1.0).
    pub energy_drain_per_tick: f64,
    /// Maximum agents assigned to one task (default: 3).
    pub max_assignees: usize,

    /// Seed for all deterministic pseudo-random choices (default: 0x5EED).
    pub seed: u64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_energy: 100.0,
            low_energy_threshold: 20.0,
            energy_restore_per_check: 5.0,
            health_check_interval: 10,
            field_bounds: 100.0,
            perturbation_decay: 0.9,
            perturbation_floor: 0.01,
            perturbation_position_step: 0.1,
            perturbation_energy_scale: 1.0,
            cooperation_constant: 0.1,
            min_separation: 1.0,
            repulsion_constant: 0.5,
            stability_cutoff: 0.3,
            restructure_drop_fraction: 0.25,
            restructure_hub_count: 3,
            new_edge_weight_min: 0.4,
            new_edge_weight_max: 0.7,
            edge_cap_multiple: 4,
            consensus_threshold: 0.8,
            base_progress_rate: 0.2,
            energy_drain_per_tick: 1.0,
            max_assignees: 3,
            seed: 0x5EED,
        }
    }
}

impl MeshConfig {
    /// Per-tick progress rate for a task at the given priority.
    pub fn progress_rate(&self, priority: u32) -> f64 {
        self.base_progress_rate * (1.0 + priority as f64 * 0.1)
    }

    /// Per-tick energy drain for a task at the given priority.
    pub fn energy_drain(&self, priority: u32) -> f64 {
        self.energy_drain_per_tick * (1.0 + priority as f64 * 0.2)
    }

    /// Maximum edge count for a graph with `nodes` nodes.
    pub fn edge_cap(&self, nodes: usize) -> usize {
        self.edge_cap_multiple * nodes
    }
}
