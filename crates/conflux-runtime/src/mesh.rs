//! Mesh — the single owning context for all mutable simulation state.
//!
//! The mesh owns the registry, interaction graph, perturbation map,
//! cooperation field, and collaboration engine. All mutations are
//! serialized through it, so no observer ever sees a partially-updated
//! graph. Time advances only through explicit `tick()` calls from an
//! external scheduler, keeping the core synchronous and deterministic.
//!
//! Each tick:
//! 1. Agents parked in Restructuring revert to Idle
//! 2. Live perturbations apply effects and decay; spent ones retire
//! 3. The cooperation field is recomputed from scratch
//! 4. On the health-check cadence: energy restoration, and restructuring
//!    when stability is below the cutoff
//! 5. The collaboration engine advances every active task
//! 6. The tick counter advances

use crate::config::MeshConfig;
use crate::engine::CollaborationEngine;
use crate::field::CooperationField;
use crate::metrics::{self, MeshMetrics};
use crate::perturbation::PerturbationMap;
use crate::registry::AgentRegistry;
use crate::restructure::{self, RestructureReport};
use crate::topology_impl::PetInteractionGraph;
use conflux_core::error::{ConfluxError, EdgeError, Result};
use conflux_core::topology::InteractionGraph;
use conflux_core::types::{
    Agent, AgentConfig, AgentId, AgentStatus, ConnectionKind, EdgeData, ForceVector,
    PerturbationKind, Position, TaskId, TaskPhase, TaskSpec, Tick,
};
use serde::Serialize;

/// Event emitted by the mesh during simulation.
#[derive(Debug, Clone, Serialize)]
pub enum MeshEvent {
    /// An agent was registered.
    AgentRegistered { id: AgentId, agent_type: String },
    /// An agent was removed; all references to it were purged.
    AgentRemoved { id: AgentId },
    /// A connection was created or re-weighted.
    Connected { a: AgentId, b: AgentId, weight: f64 },
    /// A perturbation was enqueued.
    PerturbationCreated {
        source: AgentId,
        target: AgentId,
        kind: PerturbationKind,
    },
    /// A perturbation decayed below the floor and was retired.
    PerturbationRetired { source: AgentId, target: AgentId },
    /// A restructuring pass executed.
    Restructured {
        edges_dropped: usize,
        edges_added: usize,
        score_before: f64,
        score_after: f64,
    },
    /// A task was accepted for scheduling.
    TaskCreated { id: TaskId },
    /// A task was assigned its worker set.
    TaskAssigned { id: TaskId, agents: Vec<AgentId> },
    /// A task converged and completed.
    TaskCompleted { id: TaskId, quality: f64 },
    /// A task reached terminal failure.
    TaskFailed { id: TaskId, reason: String },
    /// A tick finished.
    TickComplete { tick: Tick, stability: f64 },
}

/// Quick counters over the mesh.
#[derive(Debug, Clone, Serialize)]
pub struct MeshStats {
    pub tick: Tick,
    pub agents: usize,
    pub edges: usize,
    pub live_perturbations: usize,
    pub active_tasks: usize,
    pub archived_tasks: usize,
}

/// A serializable snapshot of an agent's state.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub agent_type: String,
    pub position: Position,
    pub energy: f64,
    pub status: AgentStatus,
    pub force: ForceVector,
}

/// A serializable snapshot of a graph edge.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeSnapshot {
    pub a: AgentId,
    pub b: AgentId,
    pub weight: f64,
    pub kind: ConnectionKind,
}

/// A serializable snapshot of a task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub name: String,
    pub phase: TaskPhase,
    pub assigned: Vec<AgentId>,
    pub consensus: f64,
}

/// A complete serializable snapshot of the mesh at a point in time,
/// suitable for handing to any transport.
#[derive(Debug, Clone, Serialize)]
pub struct MeshSnapshot {
    pub tick: Tick,
    pub agents: Vec<AgentSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub tasks: Vec<TaskSnapshot>,
    pub stats: MeshStats,
    pub metrics: MeshMetrics,
}

impl MeshSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The mesh — owns all simulation state.
pub struct Mesh {
    config: MeshConfig,
    registry: AgentRegistry,
    graph: PetInteractionGraph,
    perturbations: PerturbationMap,
    field: CooperationField,
    engine: CollaborationEngine,
    tick: Tick,
    event_history: Vec<(Tick, MeshEvent)>,
    rng_state: u64,
}

impl Mesh {
    /// Create a mesh with default configuration.
    pub fn new() -> Self {
        Self::from_config(MeshConfig::default())
    }

    /// Create a mesh with the specified configuration.
    pub fn from_config(config: MeshConfig) -> Self {
        let registry = AgentRegistry::new(config.seed);
        let rng_state = config.seed.wrapping_add(0x9E3779B97F4A7C15);
        Self {
            config,
            registry,
            graph: PetInteractionGraph::new(),
            perturbations: PerturbationMap::new(),
            field: CooperationField::new(),
            engine: CollaborationEngine::new(),
            tick: 0,
            event_history: Vec::new(),
            rng_state,
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    // --- Agent lifecycle ---

    /// Register an agent and give it a node in the interaction graph.
    pub fn register_agent(&mut self, config: AgentConfig) -> Result<AgentId> {
        let id = self.registry.register(config, &self.config, self.tick)?;
        self.graph.add_node(id);
        let agent_type = self
            .registry
            .get(&id)
            .map(|a| a.agent_type.clone())
            .unwrap_or_default();
        self.record(MeshEvent::AgentRegistered { id, agent_type });
        Ok(id)
    }

    /// Remove an agent and purge every reference to it — graph edges,
    /// perturbations, force-field entry, and task assignments — atomically
    /// with the removal. Returns `false` if the id was already absent.
    pub fn remove_agent(&mut self, id: &AgentId) -> bool {
        if self.registry.remove(id).is_none() {
            return false;
        }
        self.graph.remove_node(id);
        self.perturbations.purge_agent(id);
        self.field.remove(id);
        let task_events = self
            .engine
            .handle_agent_removed(id, &mut self.registry, self.tick);
        for event in task_events {
            self.record(event);
        }
        self.record(MeshEvent::AgentRemoved { id: *id });
        true
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.registry.get(id)
    }

    pub fn agent_count(&self) -> usize {
        self.registry.len()
    }

    // --- Topology ---

    /// Create or re-weight the connection between two agents.
    ///
    /// Fails with `InvalidEdge` if the endpoints are equal, the weight is
    /// outside [0, 1], or either agent is unregistered. Re-connecting an
    /// existing pair updates weight and kind in place — never duplicates.
    pub fn connect(
        &mut self,
        a: AgentId,
        b: AgentId,
        weight: f64,
        kind: ConnectionKind,
    ) -> Result<()> {
        if a == b {
            return Err(ConfluxError::InvalidEdge(EdgeError::SelfLoop(a)));
        }
        if !(0.0..=1.0).contains(&weight) {
            return Err(ConfluxError::invalid_weight(weight));
        }
        for id in [&a, &b] {
            if !self.registry.contains(id) {
                return Err(ConfluxError::InvalidEdge(EdgeError::EndpointMissing(*id)));
            }
        }

        if let Some(edge) = self.graph.get_edge_mut(&a, &b) {
            edge.weight = weight;
            edge.kind = kind;
        } else {
            self.graph.upsert_edge(
                a,
                b,
                EdgeData {
                    weight,
                    kind,
                    created_tick: self.tick,
                },
            );
        }
        self.record(MeshEvent::Connected { a, b, weight });
        Ok(())
    }

    pub fn graph(&self) -> &dyn InteractionGraph {
        &self.graph
    }

    /// Run a restructuring pass immediately (event-driven callers).
    pub fn restructure(&mut self) -> RestructureReport {
        let (report, event) = self.restructure_inner();
        self.record(event);
        report
    }

    fn restructure_inner(&mut self) -> (RestructureReport, MeshEvent) {
        let before = metrics::compute_stability(&self.graph).score;
        let report = restructure::restructure(
            &mut self.graph,
            &self.registry,
            &self.config,
            self.tick,
            &mut self.rng_state,
        );
        for hub in &report.hubs {
            self.registry
                .set_status(hub, AgentStatus::Restructuring, self.tick);
        }
        let after = metrics::compute_stability(&self.graph).score;
        let event = MeshEvent::Restructured {
            edges_dropped: report.edges_dropped,
            edges_added: report.edges_added,
            score_before: before,
            score_after: after,
        };
        (report, event)
    }

    // --- Perturbations ---

    /// Enqueue a directed perturbation between two registered agents.
    pub fn create_perturbation(
        &mut self,
        source: AgentId,
        target: AgentId,
        magnitude: f64,
        kind: PerturbationKind,
    ) -> Result<()> {
        self.perturbations
            .create(source, target, magnitude, kind, &self.registry, self.tick)?;
        self.record(MeshEvent::PerturbationCreated {
            source,
            target,
            kind,
        });
        Ok(())
    }

    pub fn live_perturbations(&self) -> usize {
        self.perturbations.len()
    }

    // --- Tasks ---

    /// Submit a collaboration task.
    pub fn submit_task(&mut self, spec: TaskSpec) -> Result<TaskId> {
        let id = self.engine.submit(spec, &self.registry, self.tick)?;
        self.record(MeshEvent::TaskCreated { id });
        Ok(id)
    }

    pub fn task_phase(&self, id: &TaskId) -> Option<TaskPhase> {
        self.engine.get(id).map(|t| t.phase)
    }

    // --- Simulation ---

    /// Run a single simulation tick.
    pub fn tick(&mut self) -> Vec<MeshEvent> {
        let mut events = Vec::new();

        // Phase 0: agents parked for restructuring come back. Status is
        // restored from actual energy and assignments, never assumed Idle:
        // a depleted hub stays out of the assignment pool and a mid-task
        // hub keeps its Working status.
        for id in self.registry.sorted_ids() {
            let parked =
                self.registry.get(&id).map(|a| a.status) == Some(AgentStatus::Restructuring);
            if !parked {
                continue;
            }
            let depleted = self
                .registry
                .get(&id)
                .map(|a| a.energy < self.config.low_energy_threshold)
                .unwrap_or(false);
            let status = if depleted {
                AgentStatus::Depleted
            } else if self.engine.active_tasks().any(|t| t.assigned.contains(&id)) {
                AgentStatus::Working
            } else {
                AgentStatus::Idle
            };
            self.registry.set_status(&id, status, self.tick);
        }

        // Phase 1: perturbation propagation and decay.
        let retired = self
            .perturbations
            .tick(&mut self.registry, &self.config, self.tick);
        for p in retired {
            events.push(MeshEvent::PerturbationRetired {
                source: p.source,
                target: p.target,
            });
        }

        // Phase 2: derived state.
        self.field
            .recompute(&self.registry, &self.graph, &self.config);
        let stability = metrics::compute_stability(&self.graph);

        // Phase 3: health check and restructuring on cadence.
        if self.tick > 0 && self.tick % self.config.health_check_interval == 0 {
            for id in self.registry.sorted_ids() {
                let working = self.registry.get(&id).map(|a| a.status) == Some(AgentStatus::Working);
                if !working {
                    // Registered id; restoration cannot fail.
                    let _ = self.registry.adjust_energy(
                        &id,
                        self.config.energy_restore_per_check,
                        &self.config,
                        self.tick,
                    );
                }
            }
            if stability.score < self.config.stability_cutoff && self.graph.node_count() >= 2 {
                let (_, event) = self.restructure_inner();
                events.push(event);
            }
        }

        // Phase 4: task scheduling.
        let task_events =
            self.engine
                .tick(&mut self.registry, &self.graph, &self.config, self.tick);
        events.extend(task_events);

        // Phase 5: record and advance. Events are stamped with the tick
        // they occurred in, matching out-of-band recordings.
        events.push(MeshEvent::TickComplete {
            tick: self.tick,
            stability: stability.score,
        });
        for event in &events {
            self.event_history.push((self.tick, event.clone()));
        }
        self.tick += 1;
        events
    }

    /// Run the simulation for N ticks.
    pub fn run(&mut self, ticks: u64) -> Vec<Vec<MeshEvent>> {
        let mut all_events = Vec::new();
        for _ in 0..ticks {
            all_events.push(self.tick());
        }
        all_events
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    // --- Read models ---

    /// The current force vector on an agent.
    pub fn force(&self, id: &AgentId) -> ForceVector {
        self.field.force(id)
    }

    pub fn stats(&self) -> MeshStats {
        let report = self.engine.report();
        MeshStats {
            tick: self.tick,
            agents: self.registry.len(),
            edges: self.graph.edge_count(),
            live_perturbations: self.perturbations.len(),
            active_tasks: report.active_tasks,
            archived_tasks: report.archived_tasks,
        }
    }

    /// Global stability, convergence, and performance metrics.
    pub fn metrics(&self) -> MeshMetrics {
        MeshMetrics {
            stability: metrics::compute_stability(&self.graph),
            engine: self.engine.report(),
        }
    }

    /// Take a serializable snapshot of the mesh's current state.
    pub fn snapshot(&self) -> MeshSnapshot {
        let mut agents: Vec<AgentSnapshot> = self
            .registry
            .iter()
            .map(|a| AgentSnapshot {
                id: a.id,
                name: a.name.clone(),
                agent_type: a.agent_type.clone(),
                position: a.position,
                energy: a.energy,
                status: a.status,
                force: self.field.force(&a.id),
            })
            .collect();
        agents.sort_by_key(|a| a.id);

        let edges: Vec<EdgeSnapshot> = self
            .graph
            .all_edges()
            .into_iter()
            .map(|(a, b, data)| EdgeSnapshot {
                a,
                b,
                weight: data.weight,
                kind: data.kind.clone(),
            })
            .collect();

        let mut tasks: Vec<TaskSnapshot> = self
            .engine
            .active_tasks()
            .chain(self.engine.archived_tasks().iter())
            .map(|t| TaskSnapshot {
                id: t.id,
                name: t.spec.name.clone(),
                phase: t.phase,
                assigned: t.assigned.clone(),
                consensus: t.consensus,
            })
            .collect();
        tasks.sort_by_key(|t| t.id);

        MeshSnapshot {
            tick: self.tick,
            agents,
            edges,
            tasks,
            stats: self.stats(),
            metrics: self.metrics(),
        }
    }

    /// Full event history with tick numbers.
    pub fn event_history(&self) -> &[(Tick, MeshEvent)] {
        &self.event_history
    }

    /// Drain the event history (for push-notification consumers).
    pub fn drain_events(&mut self) -> Vec<(Tick, MeshEvent)> {
        std::mem::take(&mut self.event_history)
    }

    fn record(&mut self, event: MeshEvent) {
        self.event_history.push((self.tick, event));
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflux_core::types::CollaborationMode;

    fn agent_config(caps: &[&str]) -> AgentConfig {
        AgentConfig {
            name: "worker".into(),
            agent_type: "generic".into(),
            capabilities: caps.iter().map(|c| c.to_string()).collect(),
            position: None,
            energy: None,
        }
    }

    #[test]
    fn register_and_count_agents() {
        let mut mesh = Mesh::new();
        mesh.register_agent(agent_config(&["compute"])).unwrap();
        mesh.register_agent(agent_config(&["store"])).unwrap();
        assert_eq!(mesh.agent_count(), 2);
        assert_eq!(mesh.graph().node_count(), 2);
    }

    #[test]
    fn tick_advances_simulation() {
        let mut mesh = Mesh::new();
        mesh.register_agent(agent_config(&["compute"])).unwrap();
        mesh.tick();
        assert_eq!(mesh.current_tick(), 1);
        assert_eq!(mesh.stats().tick, 1);
    }

    #[test]
    fn connect_validates_before_mutating() {
        let mut mesh = Mesh::new();
        let a = mesh.register_agent(agent_config(&["compute"])).unwrap();
        let b = mesh.register_agent(agent_config(&["store"])).unwrap();

        assert!(mesh.connect(a, a, 0.5, ConnectionKind::Initial).is_err());
        assert!(mesh.connect(a, b, 1.5, ConnectionKind::Initial).is_err());
        assert!(mesh
            .connect(a, AgentId::from_seed(99), 0.5, ConnectionKind::Initial)
            .is_err());
        assert_eq!(mesh.graph().edge_count(), 0);

        mesh.connect(a, b, 0.5, ConnectionKind::Initial).unwrap();
        mesh.connect(b, a, 0.8, ConnectionKind::Collaborative).unwrap();
        assert_eq!(mesh.graph().edge_count(), 1);
        let edge = mesh.graph().get_edge(&a, &b).unwrap();
        assert!((edge.weight - 0.8).abs() < 1e-12);
        assert_eq!(edge.kind, ConnectionKind::Collaborative);
    }

    #[test]
    fn removal_cascades_everywhere() {
        let mut mesh = Mesh::new();
        let a = mesh.register_agent(agent_config(&["compute"])).unwrap();
        let b = mesh.register_agent(agent_config(&["store"])).unwrap();
        let c = mesh.register_agent(agent_config(&["emit"])).unwrap();
        mesh.connect(a, b, 0.5, ConnectionKind::Initial).unwrap();
        mesh.connect(a, c, 0.5, ConnectionKind::Initial).unwrap();
        mesh.create_perturbation(a, b, 1.0, PerturbationKind::Information)
            .unwrap();
        mesh.create_perturbation(c, a, 1.0, PerturbationKind::Information)
            .unwrap();
        mesh.tick();

        assert!(mesh.remove_agent(&a));
        assert!(!mesh.remove_agent(&a), "second removal is a no-op");

        assert!(mesh.agent(&a).is_none());
        assert!(!mesh.graph().contains(&a));
        for (x, y, _) in mesh.graph().all_edges() {
            assert_ne!(x, a);
            assert_ne!(y, a);
        }
        assert_eq!(mesh.live_perturbations(), 0);
        assert_eq!(mesh.force(&a), ForceVector::ZERO);
    }

    #[test]
    fn health_check_restores_energy() {
        let mut mesh = Mesh::new();
        let a = mesh.register_agent(agent_config(&["compute"])).unwrap();
        let cfg = mesh.config().clone();
        // Drain well below the threshold.
        {
            let tick = mesh.current_tick();
            mesh.registry.adjust_energy(&a, -95.0, &cfg, tick).unwrap();
        }
        assert_eq!(mesh.agent(&a).unwrap().status, AgentStatus::Depleted);

        // Enough ticks for several health checks.
        mesh.run(cfg.health_check_interval * 5 + 1);
        assert!(mesh.agent(&a).unwrap().energy > 5.0);
    }

    #[test]
    fn low_stability_triggers_restructuring() {
        let mut mesh = Mesh::new();
        let caps: [&[&str]; 5] = [&["a"], &["b"], &["c"], &["d"], &["e"]];
        let ids: Vec<AgentId> = caps
            .iter()
            .map(|c| mesh.register_agent(agent_config(c)).unwrap())
            .collect();
        // Weak star: stability well below the cutoff.
        for &other in &ids[1..] {
            mesh.connect(ids[0], other, 0.01, ConnectionKind::Initial)
                .unwrap();
        }
        let before = mesh.metrics().stability.score;
        assert!(before < mesh.config().stability_cutoff);

        mesh.run(mesh.config().health_check_interval + 1);
        let restructured = mesh
            .event_history()
            .iter()
            .any(|(_, e)| matches!(e, MeshEvent::Restructured { .. }));
        assert!(restructured);
    }

    fn task_spec(caps: &[&str]) -> TaskSpec {
        TaskSpec {
            name: "job".into(),
            description: String::new(),
            task_type: "compute".into(),
            required_capabilities: caps.iter().map(|c| c.to_string()).collect(),
            priority: 5,
            mode: CollaborationMode::Parallel,
        }
    }

    #[test]
    fn restructuring_never_masks_depletion() {
        let mut mesh = Mesh::new();
        let hub = mesh.register_agent(agent_config(&["compute"])).unwrap();
        let spare = mesh.register_agent(agent_config(&["compute"])).unwrap();
        for cap in ["a", "b", "c"] {
            let leaf = mesh.register_agent(agent_config(&[cap])).unwrap();
            mesh.connect(hub, leaf, 0.05, ConnectionKind::Initial).unwrap();
        }

        let cfg = mesh.config().clone();
        {
            let tick = mesh.current_tick();
            mesh.registry.adjust_energy(&hub, -90.0, &cfg, tick).unwrap();
        }
        assert_eq!(mesh.agent(&hub).unwrap().status, AgentStatus::Depleted);

        mesh.restructure();
        assert_eq!(mesh.agent(&hub).unwrap().status, AgentStatus::Restructuring);

        let id = mesh.submit_task(task_spec(&["compute"])).unwrap();
        mesh.tick();
        assert_eq!(
            mesh.agent(&hub).unwrap().status,
            AgentStatus::Depleted,
            "depletion survives the restructuring round-trip"
        );
        mesh.tick();
        let task = mesh.engine.get(&id).unwrap();
        assert!(!task.assigned.contains(&hub), "depleted hub must not be assigned");
        assert!(task.assigned.contains(&spare));
    }

    #[test]
    fn restructuring_preserves_working_status() {
        let mut mesh = Mesh::new();
        let a = mesh.register_agent(agent_config(&["compute"])).unwrap();
        let b = mesh.register_agent(agent_config(&["compute"])).unwrap();
        let c = mesh.register_agent(agent_config(&["other"])).unwrap();
        mesh.connect(a, b, 0.3, ConnectionKind::Initial).unwrap();
        mesh.connect(a, c, 0.3, ConnectionKind::Initial).unwrap();

        let id = mesh.submit_task(task_spec(&["compute"])).unwrap();
        mesh.tick();
        mesh.tick();
        assert_eq!(mesh.agent(&a).unwrap().status, AgentStatus::Working);

        mesh.restructure();
        mesh.tick();
        assert_eq!(mesh.agent(&a).unwrap().status, AgentStatus::Working);
        assert!(!mesh.task_phase(&id).unwrap().is_terminal());
    }

    #[test]
    fn events_carry_the_tick_they_occurred_in() {
        let mut mesh = Mesh::new();
        mesh.register_agent(agent_config(&["compute"])).unwrap();
        mesh.tick();
        mesh.tick();

        for (stamp, event) in mesh.event_history() {
            if let MeshEvent::TickComplete { tick, .. } = event {
                assert_eq!(stamp, tick);
            }
        }
        let stamps: Vec<Tick> = mesh
            .event_history()
            .iter()
            .filter(|(_, e)| matches!(e, MeshEvent::TickComplete { .. }))
            .map(|(s, _)| *s)
            .collect();
        assert_eq!(stamps, vec![0, 1]);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut mesh = Mesh::new();
        let a = mesh.register_agent(agent_config(&["compute"])).unwrap();
        let b = mesh.register_agent(agent_config(&["store"])).unwrap();
        mesh.connect(a, b, 0.5, ConnectionKind::Initial).unwrap();
        mesh.tick();

        let snapshot = mesh.snapshot();
        assert_eq!(snapshot.agents.len(), 2);
        assert_eq!(snapshot.edges.len(), 1);
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"agents\""));
        assert!(json.contains("\"stability\""));
    }

    #[test]
    fn events_are_recorded_with_ticks() {
        let mut mesh = Mesh::new();
        mesh.register_agent(agent_config(&["compute"])).unwrap();
        mesh.tick();
        assert!(mesh
            .event_history()
            .iter()
            .any(|(_, e)| matches!(e, MeshEvent::AgentRegistered { .. })));
        let drained = mesh.drain_events();
        assert!(!drained.is_empty());
        assert!(mesh.event_history().is_empty());
    }
}
