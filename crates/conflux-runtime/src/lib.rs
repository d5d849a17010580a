//! # Conflux Runtime
//!
//! The simulation runtime for the Conflux agent mesh: the registry,
//! interaction graph, perturbation propagation, cooperation field,
//! topology restructuring, and the collaboration task engine — all owned
//! by a single [`mesh::Mesh`] context and advanced by explicit ticks.
//!
//! ## Quick Start
//!
//! ```rust
//! use conflux_runtime::prelude::*;
//!
//! let mut mesh = Mesh::new();
//! let a = mesh
//!     .register_agent(AgentConfig {
//!         name: "analyzer".into(),
//!         agent_type: "analysis".into(),
//!         capabilities: vec!["analyze".into()],
//!         position: None,
//!         energy: None,
//!     })
//!     .unwrap();
//! let b = mesh
//!     .register_agent(AgentConfig {
//!         name: "synthesizer".into(),
//!         agent_type: "synthesis".into(),
//!         capabilities: vec!["synthesize".into()],
//!         position: None,
//!         energy: None,
//!     })
//!     .unwrap();
//! mesh.connect(a, b, 0.6, ConnectionKind::Initial).unwrap();
//!
//! mesh.submit_task(TaskSpec {
//!     name: "analysis pass".into(),
//!     description: "analyze the corpus".into(),
//!     task_type: "analysis".into(),
//!     required_capabilities: vec!["analyze".into()],
//!     priority: 5,
//!     mode: CollaborationMode::Parallel,
//! })
//! .unwrap();
//!
//! let events = mesh.run(20);
//! assert!(!events.is_empty());
//! ```

pub mod config;
pub mod engine;
pub mod field;
pub mod mesh;
pub mod metrics;
pub mod perturbation;
pub mod registry;
pub mod restructure;
mod rng;
pub mod topology_impl;

pub mod prelude;
