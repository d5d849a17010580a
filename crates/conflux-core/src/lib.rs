//! # Conflux Core
//!
//! Core types and traits for the Conflux agent network simulation.
//!
//! This crate defines the shared vocabulary used across the workspace:
//!
//! - **Agents** — simulated autonomous entities with position, energy,
//!   capabilities, and status
//! - **Interaction graph** — the weighted topology over agent identifiers,
//!   abstracted behind the [`topology::InteractionGraph`] trait
//! - **Perturbations** — decaying directed influence events between agents
//! - **Tasks** — units of collaborative work progressing through a bounded
//!   state machine under a collaboration mode
//!
//! ## Quick Start
//!
//! ```rust
//! use conflux_core::prelude::*;
//!
//! // Create a position
//! let pos = Position::new(0.0, 0.0, 0.0);
//!
//! // Create a deterministic agent ID (for testing)
//! let id = AgentId::from_seed(42);
//! ```

pub mod error;
pub mod prelude;
pub mod topology;
pub mod types;
