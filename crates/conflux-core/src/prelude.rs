//! Conflux Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use conflux_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    Agent, AgentConfig, AgentId, AgentStatus,
    CollaborationMode, ConnectionKind, EdgeData,
    ForceVector, Perturbation, PerturbationKind,
    Position, Task, TaskId, TaskPhase, TaskSpec,
    Tick,
};

// Re-export the InteractionGraph trait
pub use crate::topology::InteractionGraph;

// Re-export error types
pub use crate::error::{ConfluxError, Result};
