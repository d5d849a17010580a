//! Perturbation propagation map — decaying directed influence events.
//!
//! Each tick, every live perturbation applies a fractional effect to its
//! target (a position nudge toward the source and an energy delta set by
//! its semantic kind), then decays. Because the effect each tick is
//! proportional to the remaining strength and strength decays
//! geometrically, the cumulative effect of a perturbation with magnitude M
//! and decay rate r is bounded by M / (1 - r) regardless of tick rate.

use crate::config::MeshConfig;
use crate::registry::AgentRegistry;
use conflux_core::error::{ConfluxError, PerturbationError, Result};
use conflux_core::types::{AgentId, Perturbation, PerturbationKind, Tick};
use tracing::warn;

/// Map of live perturbations between agents.
pub struct PerturbationMap {
    live: Vec<Perturbation>,
    total_created: u64,
    total_retired: u64,
}

impl PerturbationMap {
    pub fn new() -> Self {
        Self {
            live: Vec::new(),
            total_created: 0,
            total_retired: 0,
        }
    }

    /// Enqueue a perturbation at full strength.
    ///
    /// Fails with `InvalidPerturbation` if source == target, the magnitude
    /// is not strictly positive, or either endpoint is unregistered.
    pub fn create(
        &mut self,
        source: AgentId,
        target: AgentId,
        magnitude: f64,
        kind: PerturbationKind,
        registry: &AgentRegistry,
        tick: Tick,
    ) -> Result<()> {
        if source == target {
            return Err(ConfluxError::InvalidPerturbation(
                PerturbationError::SelfDirected(source),
            ));
        }
        if !(magnitude > 0.0) {
            return Err(ConfluxError::InvalidPerturbation(
                PerturbationError::NonPositiveMagnitude(magnitude),
            ));
        }
        for id in [&source, &target] {
            if !registry.contains(id) {
                return Err(ConfluxError::InvalidPerturbation(
                    PerturbationError::EndpointMissing(*id),
                ));
            }
        }

        self.live.push(Perturbation {
            source,
            target,
            magnitude,
            kind,
            created_tick: tick,
            strength: magnitude,
        });
        self.total_created += 1;
        Ok(())
    }

    /// Advance all live perturbations by one tick.
    ///
    /// Applies each perturbation's effect to its target, decays it, and
    /// retires it once strength falls below the floor. A failure to apply
    /// one perturbation never aborts the rest of the sweep. Returns the
    /// perturbations retired this tick.
    pub fn tick(
        &mut self,
        registry: &mut AgentRegistry,
        cfg: &MeshConfig,
        tick: Tick,
    ) -> Vec<Perturbation> {
        for p in &mut self.live {
            let source_pos = match registry.get(&p.source) {
                Some(agent) => agent.position,
                // Source vanished without a purge; drain the perturbation.
                None => {
                    warn!(target: "conflux::perturbation", "source missing, draining perturbation");
                    p.strength = 0.0;
                    continue;
                }
            };

            if !registry.contains(&p.target) {
                warn!(target: "conflux::perturbation", "target missing, draining perturbation");
                p.strength = 0.0;
                continue;
            }

            registry.nudge_toward(
                &p.target,
                &source_pos,
                p.strength * cfg.perturbation_position_step,
                tick,
            );

            let energy_delta = p.kind.energy_sign() * p.strength * cfg.perturbation_energy_scale;
            if energy_delta != 0.0 {
                // Target existence was checked above; an error here is a
                // torn sweep and worth surfacing, but never fatal.
                if let Err(e) = registry.adjust_energy(&p.target, energy_delta, cfg, tick) {
                    warn!(target: "conflux::perturbation", error = %e, "energy effect skipped");
                }
            }

            p.decay(cfg.perturbation_decay);
        }

        let floor = cfg.perturbation_floor;
        let mut retired = Vec::new();
        self.live.retain(|p| {
            if p.is_spent(floor) {
                retired.push(p.clone());
                false
            } else {
                true
            }
        });
        self.total_retired += retired.len() as u64;
        retired
    }

    /// Remove every perturbation where the agent is source or target.
    /// Returns how many were purged.
    pub fn purge_agent(&mut self, id: &AgentId) -> usize {
        let before = self.live.len();
        self.live.retain(|p| p.source != *id && p.target != *id);
        before - self.live.len()
    }

    pub fn live(&self) -> &[Perturbation] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn total_created(&self) -> u64 {
        self.total_created
    }

    pub fn total_retired(&self) -> u64 {
        self.total_retired
    }
}

impl Default for PerturbationMap {
    fn default() -> Self {
        Self::new()
    }
}
