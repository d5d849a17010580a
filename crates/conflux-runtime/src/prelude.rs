//! Conflux Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use conflux_runtime::prelude::*;
//! ```

// Re-export the core vocabulary
pub use conflux_core::prelude::*;

// Runtime surface
pub use crate::config::MeshConfig;
pub use crate::engine::CollaborationEngine;
pub use crate::field::{affinity, CooperationField};
pub use crate::mesh::{Mesh, MeshEvent, MeshSnapshot, MeshStats};
pub use crate::metrics::{compute_stability, EngineReport, MeshMetrics, StabilityReport};
pub use crate::perturbation::PerturbationMap;
pub use crate::registry::AgentRegistry;
pub use crate::restructure::RestructureReport;
pub use crate::topology_impl::PetInteractionGraph;
