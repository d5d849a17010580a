//! Shared types used across all Conflux components.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for an agent in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic ID for tests and seeded scenarios.
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(0, seed))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a collaboration task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(1, seed))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// The current tick of the simulation.
pub type Tick = u64;

/// A position in the mesh's 3-D spatial field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    /// Whether all components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Move this position toward `target` by `step` (never overshooting).
    pub fn nudge_toward(&mut self, target: &Position, step: f64) {
        let dist = self.distance_to(target);
        if dist < f64::EPSILON {
            return;
        }
        let t = (step / dist).min(1.0);
        self.x += (target.x - self.x) * t;
        self.y += (target.y - self.y) * t;
        self.z += (target.z - self.z) * t;
    }
}

/// A derived per-agent force vector — the net cooperative pull on an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ForceVector {
    pub const ZERO: ForceVector = ForceVector { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Default for ForceVector {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Lifecycle status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    /// Available for assignment.
    Idle,
    /// Actively assigned to at least one task.
    Working,
    /// Energy below the low threshold — excluded from new assignments.
    Depleted,
    /// Participating in a topology restructure this tick.
    Restructuring,
}

/// A simulated autonomous agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub agent_type: String,
    /// Ordered capability tags. Never empty for a registered agent.
    pub capabilities: BTreeSet<String>,
    pub position: Position,
    /// Bounded energy level in [0, max_energy].
    pub energy: f64,
    pub status: AgentStatus,
    /// Tick of the last mutation, used by downstream decay calculations.
    pub last_updated: Tick,
}

impl Agent {
    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.contains(tag)
    }

    /// Count of this agent's capabilities present in `required`.
    pub fn capability_matches(&self, required: &[String]) -> usize {
        required.iter().filter(|c| self.capabilities.contains(c.as_str())).count()
    }
}

/// Input for registering an agent. Unspecified fields get validated defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub agent_type: String,
    pub capabilities: Vec<String>,
    /// Random position within the field bounds if `None`.
    pub position: Option<Position>,
    /// Full energy if `None`.
    pub energy: Option<f64>,
}

/// The type of a connection in the interaction graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// Seeded at registration or by an external caller.
    Initial,
    /// Created by restructuring.
    Derived,
    /// Created by task collaboration.
    Collaborative,
    /// Custom kind for domain-specific use.
    Custom(String),
}

/// Data stored on an interaction graph edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    /// Connection strength in [0, 1].
    pub weight: f64,
    pub kind: ConnectionKind,
    pub created_tick: Tick,
}

/// Semantic category of a perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerturbationKind {
    /// Cooperative influence — restores target energy.
    Collaboration,
    /// Scheduling influence — restores target energy.
    Coordination,
    /// Informational influence — energy-neutral.
    Information,
    /// Disruptive influence — drains target energy.
    Interference,
}

impl PerturbationKind {
    /// Sign of the energy effect this kind applies to its target.
    pub fn energy_sign(&self) -> f64 {
        match self {
            PerturbationKind::Collaboration | PerturbationKind::Coordination => 1.0,
            PerturbationKind::Information => 0.0,
            PerturbationKind::Interference => -1.0,
        }
    }
}

/// A decaying directed influence event between two agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perturbation {
    pub source: AgentId,
    pub target: AgentId,
    /// Initial magnitude. Strictly positive.
    pub magnitude: f64,
    pub kind: PerturbationKind,
    pub created_tick: Tick,
    /// Remaining strength. Decays monotonically toward zero.
    pub strength: f64,
}

impl Perturbation {
    /// Apply one tick of exponential decay.
    pub fn decay(&mut self, rate: f64) {
        self.strength *= rate;
    }

    /// Whether this perturbation has decayed below the retirement floor.
    pub fn is_spent(&self, floor: f64) -> bool {
        self.strength < floor
    }
}

/// How a task's assigned agents are expected to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollaborationMode {
    /// One active worker at a time, in agent-id order.
    Sequential,
    /// All workers active; converges on an affinity-weighted consensus.
    Parallel,
    /// A coordinator gates completion; subordinates contribute partial progress.
    Hierarchical,
}

/// Phase of a collaboration task's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPhase {
    Pending,
    Assigning,
    InProgress,
    Converging,
    Completed,
    Failed,
}

impl TaskPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskPhase::Completed | TaskPhase::Failed)
    }
}

/// Input for submitting a collaboration task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub task_type: String,
    /// Must be non-empty; at least one registered agent must match one entry.
    pub required_capabilities: Vec<String>,
    /// Higher is more urgent. Scales energy drain and progress rate.
    pub priority: u32,
    pub mode: CollaborationMode,
}

/// A collaboration task tracked by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub spec: TaskSpec,
    pub phase: TaskPhase,
    /// Assigned agents, sorted by id for deterministic iteration.
    pub assigned: Vec<AgentId>,
    /// Gate agent for hierarchical mode. `None` for other modes.
    pub coordinator: Option<AgentId>,
    /// Per-agent progress in [0, 1].
    pub progress: Vec<(AgentId, f64)>,
    /// Affinity-weighted consensus score in [0, 1].
    pub consensus: f64,
    pub created_tick: Tick,
    /// Tick the task reached a terminal phase, if it has.
    pub finished_tick: Option<Tick>,
    /// Quality score derived from the final consensus/progress value.
    pub quality: f64,
}

impl Task {
    pub fn progress_of(&self, id: &AgentId) -> Option<f64> {
        self.progress.iter().find(|(a, _)| a == id).map(|(_, p)| *p)
    }
}
