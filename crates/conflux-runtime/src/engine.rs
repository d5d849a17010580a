//! Collaboration engine — task scheduling over the agent pool.
//!
//! Tasks move through `PENDING -> ASSIGNING -> IN_PROGRESS -> {CONVERGING
//! -> COMPLETED | FAILED}`. Assignment is greedy and deterministic; per-mode
//! convergence is dispatched from one state machine over the task's
//! collaboration mode. Terminal tasks are archived, never deleted, so
//! global counters can always be recomputed.

use crate::config::MeshConfig;
use crate::field;
use crate::mesh::MeshEvent;
use crate::metrics::EngineReport;
use crate::registry::AgentRegistry;
use conflux_core::error::{ConfluxError, Result, TaskError};
use conflux_core::topology::InteractionGraph;
use conflux_core::types::{
    AgentId, AgentStatus, CollaborationMode, Task, TaskId, TaskPhase, TaskSpec, Tick,
};
use std::collections::BTreeMap;
use tracing::warn;

/// Task scheduler over the shared agent pool.
pub struct CollaborationEngine {
    /// Active (non-terminal) tasks, in id order for deterministic ticks.
    active: BTreeMap<TaskId, Task>,
    /// Terminal tasks, kept for metrics aggregation.
    archive: Vec<Task>,
    tasks_processed: u64,
    successful: u64,
    failed: u64,
    response_tick_sum: u64,
    quality_sum: f64,
}

impl CollaborationEngine {
    pub fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            archive: Vec::new(),
            tasks_processed: 0,
            successful: 0,
            failed: 0,
            response_tick_sum: 0,
            quality_sum: 0.0,
        }
    }

    /// Submit a task for scheduling.
    ///
    /// Fails with `InvalidTask` if the required capability set is empty or
    /// no registered agent satisfies any required capability. Nothing is
    /// created on failure.
    pub fn submit(&mut self, spec: TaskSpec, registry: &AgentRegistry, tick: Tick) -> Result<TaskId> {
        if spec.required_capabilities.is_empty() {
            return Err(ConfluxError::InvalidTask(TaskError::NoRequiredCapabilities));
        }
        let satisfiable = registry
            .iter()
            .any(|a| a.capability_matches(&spec.required_capabilities) > 0);
        if !satisfiable {
            return Err(ConfluxError::InvalidTask(TaskError::NoCapableAgents));
        }

        let id = TaskId::new();
        self.active.insert(
            id,
            Task {
                id,
                spec,
                phase: TaskPhase::Pending,
                assigned: Vec::new(),
                coordinator: None,
                progress: Vec::new(),
                consensus: 0.0,
                created_tick: tick,
                finished_tick: None,
                quality: 0.0,
            },
        );
        Ok(id)
    }

    /// Advance every active task by one scheduling step.
    ///
    /// A fault while stepping one task is logged and isolated — it never
    /// aborts the remaining tasks.
    pub fn tick(
        &mut self,
        registry: &mut AgentRegistry,
        graph: &dyn InteractionGraph,
        cfg: &MeshConfig,
        tick: Tick,
    ) -> Vec<MeshEvent> {
        let mut events = Vec::new();
        let ids: Vec<TaskId> = self.active.keys().copied().collect();

        for id in ids {
            let Some(mut task) = self.active.remove(&id) else {
                continue;
            };
            self.step(&mut task, registry, graph, cfg, tick, &mut events);
            if task.phase.is_terminal() {
                self.release_agents(&task, registry, tick);
                self.archive.push(task);
            } else {
                self.active.insert(id, task);
            }
        }
        events
    }

    fn step(
        &mut self,
        task: &mut Task,
        registry: &mut AgentRegistry,
        graph: &dyn InteractionGraph,
        cfg: &MeshConfig,
        tick: Tick,
        events: &mut Vec<MeshEvent>,
    ) {
        match task.phase {
            TaskPhase::Pending => {
                task.phase = TaskPhase::Assigning;
            }
            TaskPhase::Assigning => self.assign(task, registry, graph, cfg, tick, events),
            TaskPhase::InProgress => self.progress(task, registry, graph, cfg, tick, events),
            TaskPhase::Converging => {
                task.quality = task.consensus.clamp(0.0, 1.0);
                self.finish(task, TaskPhase::Completed, tick);
                events.push(MeshEvent::TaskCompleted {
                    id: task.id,
                    quality: task.quality,
                });
            }
            TaskPhase::Completed | TaskPhase::Failed => {}
        }
    }

    /// Greedy deterministic selection: rank candidates by capability match
    /// count, then energy, then cooperation-field affinity to the agents
    /// already selected; ties broken by lowest agent id.
    fn assign(
        &mut self,
        task: &mut Task,
        registry: &mut AgentRegistry,
        graph: &dyn InteractionGraph,
        cfg: &MeshConfig,
        tick: Tick,
        events: &mut Vec<MeshEvent>,
    ) {
        let required = task.spec.required_capabilities.clone();
        let mut pool: Vec<AgentId> = registry
            .iter()
            .filter(|a| a.status != AgentStatus::Depleted)
            .filter(|a| a.capability_matches(&required) > 0)
            .map(|a| a.id)
            .collect();
        pool.sort();

        let mut selected: Vec<AgentId> = Vec::new();
        while selected.len() < cfg.max_assignees && !pool.is_empty() {
            let mut best: Option<(usize, usize, f64, f64)> = None; // (idx, matches, energy, affinity)
            for (idx, id) in pool.iter().enumerate() {
                let agent = registry.get(id).expect("pool ids are registered");
                let matches = agent.capability_matches(&required);
                let energy = agent.energy;
                let aff: f64 = selected
                    .iter()
                    .map(|s| field::affinity(registry, graph, id, s))
                    .sum();
                let better = match &best {
                    None => true,
                    Some((bidx, bm, be, ba)) => {
                        let b_id = pool[*bidx];
                        (matches, energy, aff, std::cmp::Reverse(*id))
                            > (*bm, *be, *ba, std::cmp::Reverse(b_id))
                    }
                };
                if better {
                    best = Some((idx, matches, energy, aff));
                }
            }
            let Some((idx, ..)) = best else { break };
            selected.push(pool.remove(idx));
        }

        if selected.is_empty() {
            // Unschedulable given the current pool: terminal failure, not a fault.
            warn!(target: "conflux::engine", task = %task.spec.name, "task unschedulable");
            self.finish(task, TaskPhase::Failed, tick);
            events.push(MeshEvent::TaskFailed {
                id: task.id,
                reason: "unschedulable: no eligible agent in pool".to_string(),
            });
            return;
        }

        selected.sort();
        if task.spec.mode == CollaborationMode::Hierarchical {
            // Coordinator: best capability match, lowest id on ties.
            task.coordinator = selected
                .iter()
                .max_by_key(|id| {
                    let matches = registry
                        .get(id)
                        .map(|a| a.capability_matches(&required))
                        .unwrap_or(0);
                    (matches, std::cmp::Reverse(**id))
                })
                .copied();
        }
        task.progress = selected.iter().map(|id| (*id, 0.0)).collect();
        task.assigned = selected;
        task.consensus = 0.0;
        for id in &task.assigned {
            registry.set_status(id, AgentStatus::Working, tick);
        }
        task.phase = TaskPhase::InProgress;
        events.push(MeshEvent::TaskAssigned {
            id: task.id,
            agents: task.assigned.clone(),
        });
    }

    fn progress(
        &mut self,
        task: &mut Task,
        registry: &mut AgentRegistry,
        graph: &dyn InteractionGraph,
        cfg: &MeshConfig,
        tick: Tick,
        events: &mut Vec<MeshEvent>,
    ) {
        let priority = task.spec.priority;
        let rate = cfg.progress_rate(priority);
        let drain = cfg.energy_drain(priority);

        // Active worker set and per-agent rate factor by mode.
        let active: Vec<(AgentId, f64)> = match task.spec.mode {
            CollaborationMode::Sequential => task
                .progress
                .iter()
                .find(|(_, p)| *p < 1.0)
                .map(|(id, _)| vec![(*id, 1.0)])
                .unwrap_or_default(),
            CollaborationMode::Parallel => {
                task.progress.iter().map(|(id, _)| (*id, 1.0)).collect()
            }
            CollaborationMode::Hierarchical => task
                .progress
                .iter()
                .map(|(id, _)| {
                    let factor = if Some(*id) == task.coordinator { 1.0 } else { 0.5 };
                    (*id, factor)
                })
                .collect(),
        };

        for (id, factor) in active {
            let depleted = registry
                .get(&id)
                .map(|a| a.status == AgentStatus::Depleted)
                .unwrap_or(true);
            if depleted {
                continue;
            }
            if let Err(e) = registry.adjust_energy(&id, -drain, cfg, tick) {
                warn!(target: "conflux::engine", error = %e, "energy drain skipped");
                continue;
            }
            if let Some(entry) = task.progress.iter_mut().find(|(a, _)| *a == id) {
                entry.1 = (entry.1 + rate * factor).min(1.0);
            }
        }

        task.consensus = consensus(task, registry, graph);

        let converged = match task.spec.mode {
            CollaborationMode::Sequential => task.progress.iter().all(|(_, p)| *p >= 1.0),
            CollaborationMode::Parallel => task.consensus >= cfg.consensus_threshold,
            CollaborationMode::Hierarchical => task
                .coordinator
                .and_then(|c| task.progress_of(&c))
                .map(|p| p >= 1.0)
                .unwrap_or(false),
        };

        if converged {
            task.phase = TaskPhase::Converging;
            return;
        }

        let all_depleted = task.assigned.iter().all(|id| {
            registry
                .get(id)
                .map(|a| a.status == AgentStatus::Depleted)
                .unwrap_or(true)
        });
        if all_depleted {
            self.finish(task, TaskPhase::Failed, tick);
            events.push(MeshEvent::TaskFailed {
                id: task.id,
                reason: "all assigned agents depleted".to_string(),
            });
        }
    }

    /// React to an agent's removal: cancel its assignments and re-evaluate
    /// each affected task's viability.
    pub fn handle_agent_removed(
        &mut self,
        removed: &AgentId,
        registry: &mut AgentRegistry,
        tick: Tick,
    ) -> Vec<MeshEvent> {
        let mut events = Vec::new();
        let ids: Vec<TaskId> = self.active.keys().copied().collect();

        for id in ids {
            let Some(mut task) = self.active.remove(&id) else {
                continue;
            };
            if task.assigned.contains(removed) {
                task.assigned.retain(|a| a != removed);
                task.progress.retain(|(a, _)| a != removed);
                let lost_coordinator = task.coordinator == Some(*removed);
                if lost_coordinator {
                    task.coordinator = None;
                }

                let viable = registry
                    .iter()
                    .any(|a| a.capability_matches(&task.spec.required_capabilities) > 0);

                if !viable {
                    self.finish(&mut task, TaskPhase::Failed, tick);
                    events.push(MeshEvent::TaskFailed {
                        id: task.id,
                        reason: "capability requirements unsatisfiable after agent removal"
                            .to_string(),
                    });
                } else if task.assigned.is_empty() || lost_coordinator {
                    // Back through assignment to rebuild the worker set.
                    for a in &task.assigned {
                        registry.set_status(a, AgentStatus::Idle, tick);
                    }
                    task.assigned.clear();
                    task.progress.clear();
                    task.consensus = 0.0;
                    task.phase = TaskPhase::Assigning;
                }
            }
            if task.phase.is_terminal() {
                self.release_agents(&task, registry, tick);
                self.archive.push(task);
            } else {
                self.active.insert(id, task);
            }
        }
        events
    }

    /// Terminal bookkeeping shared by completion and failure.
    fn finish(&mut self, task: &mut Task, phase: TaskPhase, tick: Tick) {
        task.phase = phase;
        task.finished_tick = Some(tick);
        self.tasks_processed += 1;
        self.response_tick_sum += tick.saturating_sub(task.created_tick);
        match phase {
            TaskPhase::Completed => {
                self.successful += 1;
                self.quality_sum += task.quality;
            }
            TaskPhase::Failed => {
                self.failed += 1;
            }
            _ => unreachable!("finish is only called with a terminal phase"),
        }
    }

    /// Return a terminal task's agents to Idle unless another active task
    /// still holds them.
    fn release_agents(&self, task: &Task, registry: &mut AgentRegistry, tick: Tick) {
        for id in &task.assigned {
            let still_busy = self
                .active
                .values()
                .any(|t| t.id != task.id && t.assigned.contains(id));
            if still_busy {
                continue;
            }
            if registry.get(id).map(|a| a.status == AgentStatus::Working) == Some(true) {
                registry.set_status(id, AgentStatus::Idle, tick);
            }
        }
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.active
            .get(id)
            .or_else(|| self.archive.iter().find(|t| t.id == *id))
    }

    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.active.values()
    }

    pub fn archived_tasks(&self) -> &[Task] {
        &self.archive
    }

    /// Aggregate performance counters.
    pub fn report(&self) -> EngineReport {
        let avg_response_ticks = if self.tasks_processed > 0 {
            self.response_tick_sum as f64 / self.tasks_processed as f64
        } else {
            0.0
        };
        let quality_score = if self.successful > 0 {
            self.quality_sum / self.successful as f64
        } else {
            0.0
        };
        let convergence = if self.active.is_empty() {
            1.0
        } else {
            self.active.values().map(|t| t.consensus).sum::<f64>() / self.active.len() as f64
        };
        EngineReport {
            active_tasks: self.active.len(),
            archived_tasks: self.archive.len(),
            tasks_processed: self.tasks_processed,
            successful_collaborations: self.successful,
            failed_collaborations: self.failed,
            avg_response_ticks,
            quality_score,
            convergence,
        }
    }
}

impl Default for CollaborationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode-specific consensus score in [0, 1].
fn consensus(task: &Task, registry: &AgentRegistry, graph: &dyn InteractionGraph) -> f64 {
    if task.progress.is_empty() {
        return 0.0;
    }
    match task.spec.mode {
        CollaborationMode::Sequential => {
            task.progress.iter().map(|(_, p)| p).sum::<f64>() / task.progress.len() as f64
        }
        CollaborationMode::Parallel => {
            // Weight each agent's progress by its affinity to its peers.
            let mut weighted = 0.0;
            let mut total = 0.0;
            for (id, p) in &task.progress {
                let peer_affinity: f64 = task
                    .progress
                    .iter()
                    .filter(|(other, _)| other != id)
                    .map(|(other, _)| field::affinity(registry, graph, id, other))
                    .sum();
                let w = 1.0 + peer_affinity;
                weighted += w * p;
                total += w;
            }
            weighted / total
        }
        CollaborationMode::Hierarchical => {
            let coord = task
                .coordinator
                .and_then(|c| task.progress_of(&c))
                .unwrap_or(0.0);
            let subs: Vec<f64> = task
                .progress
                .iter()
                .filter(|(id, _)| Some(*id) != task.coordinator)
                .map(|(_, p)| *p)
                .collect();
            if subs.is_empty() {
                coord
            } else {
                0.7 * coord + 0.3 * (subs.iter().sum::<f64>() / subs.len() as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology_impl::PetInteractionGraph;
    use conflux_core::types::{AgentConfig, ConnectionKind, EdgeData, Position};

    fn spec(caps: &[&str], mode: CollaborationMode, priority: u32) -> TaskSpec {
        TaskSpec {
            name: "job".into(),
            description: String::new(),
            task_type: "compute".into(),
            required_capabilities: caps.iter().map(|c| c.to_string()).collect(),
            priority,
            mode,
        }
    }

    fn register(reg: &mut AgentRegistry, cfg: &MeshConfig, caps: &[&str], x: f64) -> AgentId {
        reg.register(
            AgentConfig {
                name: "a".into(),
                agent_type: "t".into(),
                capabilities: caps.iter().map(|c| c.to_string()).collect(),
                position: Some(Position::new(x, 0.0, 0.0)),
                energy: None,
            },
            cfg,
            0,
        )
        .unwrap()
    }

    fn run_until_terminal(
        engine: &mut CollaborationEngine,
        id: TaskId,
        reg: &mut AgentRegistry,
        graph: &PetInteractionGraph,
        cfg: &MeshConfig,
        max_ticks: u64,
    ) -> TaskPhase {
        for t in 0..max_ticks {
            engine.tick(reg, graph, cfg, t);
            let phase = engine.get(&id).unwrap().phase;
            if phase.is_terminal() {
                return phase;
            }
        }
        engine.get(&id).unwrap().phase
    }

    #[test]
    fn submit_rejects_empty_capabilities() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        register(&mut reg, &cfg, &["compute"], 0.0);
        let mut engine = CollaborationEngine::new();
        let err = engine.submit(spec(&[], CollaborationMode::Parallel, 1), &reg, 0);
        assert!(matches!(err, Err(ConfluxError::InvalidTask(_))));
    }

    #[test]
    fn submit_rejects_unsatisfiable_capability() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        register(&mut reg, &cfg, &["compute"], 0.0);
        let mut engine = CollaborationEngine::new();
        let err = engine.submit(spec(&["teleport"], CollaborationMode::Parallel, 1), &reg, 0);
        assert!(matches!(err, Err(ConfluxError::InvalidTask(_))));
        assert_eq!(engine.report().active_tasks, 0);
    }

    #[test]
    fn parallel_task_completes_and_counts_one_success() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        let a = register(&mut reg, &cfg, &["compute"], 0.0);
        let b = register(&mut reg, &cfg, &["compute"], 5.0);

        let mut graph = PetInteractionGraph::new();
        graph.add_node(a);
        graph.add_node(b);
        graph.upsert_edge(
            a,
            b,
            EdgeData {
                weight: 0.9,
                kind: ConnectionKind::Initial,
                created_tick: 0,
            },
        );

        let mut engine = CollaborationEngine::new();
        let id = engine
            .submit(spec(&["compute"], CollaborationMode::Parallel, 5), &reg, 0)
            .unwrap();

        let phase = run_until_terminal(&mut engine, id, &mut reg, &graph, &cfg, 50);
        assert_eq!(phase, TaskPhase::Completed);

        let report = engine.report();
        assert_eq!(report.successful_collaborations, 1);
        assert_eq!(report.tasks_processed, 1);
        assert!(report.quality_score >= cfg.consensus_threshold);
        assert!(report.avg_response_ticks > 0.0);

        let task = engine.get(&id).unwrap();
        assert!(!task.assigned.is_empty());
        assert_eq!(reg.get(&a).unwrap().status, AgentStatus::Idle);
    }

    #[test]
    fn sequential_mode_runs_one_worker_at_a_time() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        let a = register(&mut reg, &cfg, &["compute"], 0.0);
        let b = register(&mut reg, &cfg, &["compute"], 5.0);
        let graph = PetInteractionGraph::new();

        let mut engine = CollaborationEngine::new();
        let id = engine
            .submit(spec(&["compute"], CollaborationMode::Sequential, 5), &reg, 0)
            .unwrap();

        // Pending -> Assigning -> InProgress, then first progress step.
        engine.tick(&mut reg, &graph, &cfg, 0);
        engine.tick(&mut reg, &graph, &cfg, 1);
        engine.tick(&mut reg, &graph, &cfg, 2);

        let task = engine.get(&id).unwrap();
        let first = task.assigned[0];
        let second = task.assigned[1];
        assert!(first < second, "assigned is id-sorted");
        assert!(task.progress_of(&first).unwrap() > 0.0);
        assert_eq!(task.progress_of(&second).unwrap(), 0.0);

        let phase = run_until_terminal(&mut engine, id, &mut reg, &graph, &cfg, 50);
        assert_eq!(phase, TaskPhase::Completed);
        let _ = (a, b);
    }

    #[test]
    fn hierarchical_completion_is_gated_by_coordinator() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        // One agent matches both requirements, the other only one.
        register(&mut reg, &cfg, &["plan", "compute"], 0.0);
        register(&mut reg, &cfg, &["compute"], 5.0);
        let graph = PetInteractionGraph::new();

        let mut engine = CollaborationEngine::new();
        let id = engine
            .submit(
                spec(&["plan", "compute"], CollaborationMode::Hierarchical, 5),
                &reg,
                0,
            )
            .unwrap();

        engine.tick(&mut reg, &graph, &cfg, 0);
        engine.tick(&mut reg, &graph, &cfg, 1);
        let task = engine.get(&id).unwrap();
        let coord = task.coordinator.expect("hierarchical task has a coordinator");
        assert_eq!(
            reg.get(&coord).unwrap().capability_matches(&task.spec.required_capabilities),
            2
        );

        let phase = run_until_terminal(&mut engine, id, &mut reg, &graph, &cfg, 50);
        assert_eq!(phase, TaskPhase::Completed);
        let task = engine.get(&id).unwrap();
        assert!(task.progress_of(&coord).unwrap() >= 1.0);
    }

    #[test]
    fn task_fails_when_all_assigned_deplete() {
        let mut cfg = MeshConfig::default();
        cfg.base_progress_rate = 0.001; // too slow to converge
        cfg.energy_drain_per_tick = 30.0;
        let mut reg = AgentRegistry::new(1);
        register(&mut reg, &cfg, &["compute"], 0.0);
        let graph = PetInteractionGraph::new();

        let mut engine = CollaborationEngine::new();
        let id = engine
            .submit(spec(&["compute"], CollaborationMode::Parallel, 5), &reg, 0)
            .unwrap();

        let phase = run_until_terminal(&mut engine, id, &mut reg, &graph, &cfg, 50);
        assert_eq!(phase, TaskPhase::Failed);
        assert_eq!(engine.report().failed_collaborations, 1);
        assert_eq!(engine.report().successful_collaborations, 0);
    }

    #[test]
    fn depleted_pool_makes_task_unschedulable() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        let a = register(&mut reg, &cfg, &["compute"], 0.0);
        let graph = PetInteractionGraph::new();

        let mut engine = CollaborationEngine::new();
        let id = engine
            .submit(spec(&["compute"], CollaborationMode::Parallel, 5), &reg, 0)
            .unwrap();
        // Deplete the only capable agent before assignment runs.
        reg.adjust_energy(&a, -100.0, &cfg, 0).unwrap();

        let phase = run_until_terminal(&mut engine, id, &mut reg, &graph, &cfg, 10);
        assert_eq!(phase, TaskPhase::Failed);
    }

    #[test]
    fn removal_of_sole_capable_agent_fails_task() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        let a = register(&mut reg, &cfg, &["compute"], 0.0);
        register(&mut reg, &cfg, &["other"], 5.0);
        let graph = PetInteractionGraph::new();

        let mut engine = CollaborationEngine::new();
        let id = engine
            .submit(spec(&["compute"], CollaborationMode::Parallel, 5), &reg, 0)
            .unwrap();
        engine.tick(&mut reg, &graph, &cfg, 0);
        engine.tick(&mut reg, &graph, &cfg, 1);
        assert_eq!(engine.get(&id).unwrap().phase, TaskPhase::InProgress);

        reg.remove(&a);
        let events = engine.handle_agent_removed(&a, &mut reg, 2);
        assert!(matches!(events.as_slice(), [MeshEvent::TaskFailed { .. }]));
        assert_eq!(engine.get(&id).unwrap().phase, TaskPhase::Failed);
        assert!(engine.get(&id).unwrap().assigned.is_empty());
    }

    #[test]
    fn removal_with_replacement_available_reassigns() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        let a = register(&mut reg, &cfg, &["compute"], 0.0);
        let b = register(&mut reg, &cfg, &["compute"], 5.0);
        let graph = PetInteractionGraph::new();

        let mut engine = CollaborationEngine::new();
        let id = engine
            .submit(spec(&["compute"], CollaborationMode::Sequential, 5), &reg, 0)
            .unwrap();
        engine.tick(&mut reg, &graph, &cfg, 0);
        engine.tick(&mut reg, &graph, &cfg, 1);

        // Both were assigned; remove one and the task stays viable.
        reg.remove(&a);
        engine.handle_agent_removed(&a, &mut reg, 2);
        let task = engine.get(&id).unwrap();
        assert!(!task.phase.is_terminal());
        assert!(!task.assigned.contains(&a));

        let phase = run_until_terminal(&mut engine, id, &mut reg, &graph, &cfg, 60);
        assert_eq!(phase, TaskPhase::Completed);
        let _ = b;
    }

    #[test]
    fn completed_tasks_always_have_assignees() {
        let cfg = MeshConfig::default();
        let mut reg = AgentRegistry::new(1);
        register(&mut reg, &cfg, &["compute"], 0.0);
        let graph = PetInteractionGraph::new();

        let mut engine = CollaborationEngine::new();
        for priority in 1..4 {
            engine
                .submit(spec(&["compute"], CollaborationMode::Parallel, priority), &reg, 0)
                .unwrap();
        }
        for t in 0..100 {
            engine.tick(&mut reg, &graph, &cfg, t);
        }
        for task in engine.archived_tasks() {
            if task.phase == TaskPhase::Completed {
                assert!(!task.assigned.is_empty());
            }
        }
    }
}
