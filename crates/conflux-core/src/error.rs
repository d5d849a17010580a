//! Error types for Conflux operations.
//!
//! Structural requests are validated before any state mutation, so every
//! error here means nothing was applied.

use crate::types::{AgentId, TaskId};
use std::error::Error;
use std::fmt;

/// Result type for Conflux operations.
pub type Result<T> = std::result::Result<T, ConfluxError>;

/// Errors that can occur during Conflux operations.
#[derive(Debug, Clone)]
pub enum ConfluxError {
    /// Malformed agent creation input.
    InvalidConfig(ConfigError),
    /// Malformed connection request.
    InvalidEdge(EdgeError),
    /// Malformed perturbation request.
    InvalidPerturbation(PerturbationError),
    /// Malformed task submission.
    InvalidTask(TaskError),
    /// Operation referencing an unknown agent or task.
    NotFound(NotFound),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for ConfluxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfluxError::InvalidConfig(e) => write!(f, "Invalid agent config: {}", e),
            ConfluxError::InvalidEdge(e) => write!(f, "Invalid edge: {}", e),
            ConfluxError::InvalidPerturbation(e) => write!(f, "Invalid perturbation: {}", e),
            ConfluxError::InvalidTask(e) => write!(f, "Invalid task: {}", e),
            ConfluxError::NotFound(e) => write!(f, "Not found: {}", e),
            ConfluxError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for ConfluxError {}

impl From<serde_json::Error> for ConfluxError {
    fn from(e: serde_json::Error) -> Self {
        ConfluxError::Serialization(e.to_string())
    }
}

/// Agent configuration errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// The capability set is empty.
    EmptyCapabilities,
    /// A position component is NaN or infinite.
    NonFinitePosition,
    /// A numeric field is outside its allowed range.
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyCapabilities => write!(f, "capability set is empty"),
            ConfigError::NonFinitePosition => write!(f, "position components must be finite"),
            ConfigError::OutOfRange {
                field,
                min,
                max,
                value,
            } => {
                write!(f, "{} out of range: {} (must be {}-{})", field, value, min, max)
            }
        }
    }
}

/// Connection request errors.
#[derive(Debug, Clone)]
pub enum EdgeError {
    /// Both endpoints are the same agent.
    SelfLoop(AgentId),
    /// Weight outside [0, 1].
    InvalidWeight(f64),
    /// An endpoint is not a registered agent.
    EndpointMissing(AgentId),
}

impl fmt::Display for EdgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeError::SelfLoop(id) => write!(f, "self-loop on agent {:?}", id.0),
            EdgeError::InvalidWeight(w) => {
                write!(f, "invalid weight: {} (must be 0.0-1.0)", w)
            }
            EdgeError::EndpointMissing(id) => write!(f, "endpoint not registered: {:?}", id.0),
        }
    }
}

/// Perturbation request errors.
#[derive(Debug, Clone)]
pub enum PerturbationError {
    /// Source and target are the same agent.
    SelfDirected(AgentId),
    /// Magnitude must be strictly positive.
    NonPositiveMagnitude(f64),
    /// Source or target is not a registered agent.
    EndpointMissing(AgentId),
}

impl fmt::Display for PerturbationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerturbationError::SelfDirected(id) => {
                write!(f, "self-directed perturbation on agent {:?}", id.0)
            }
            PerturbationError::NonPositiveMagnitude(m) => {
                write!(f, "magnitude must be positive, got {}", m)
            }
            PerturbationError::EndpointMissing(id) => {
                write!(f, "endpoint not registered: {:?}", id.0)
            }
        }
    }
}

/// Task submission errors.
#[derive(Debug, Clone)]
pub enum TaskError {
    /// `required_capabilities` is empty.
    NoRequiredCapabilities,
    /// No registered agent satisfies any required capability.
    NoCapableAgents,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::NoRequiredCapabilities => {
                write!(f, "required capability set is empty")
            }
            TaskError::NoCapableAgents => {
                write!(f, "no registered agent satisfies any required capability")
            }
        }
    }
}

/// Missing-entity signals.
#[derive(Debug, Clone)]
pub enum NotFound {
    Agent(AgentId),
    Task(TaskId),
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Agent(id) => write!(f, "agent {:?}", id.0),
            NotFound::Task(id) => write!(f, "task {:?}", id.0),
        }
    }
}

// Convenience constructors
impl ConfluxError {
    pub fn agent_not_found(id: AgentId) -> Self {
        ConfluxError::NotFound(NotFound::Agent(id))
    }

    pub fn task_not_found(id: TaskId) -> Self {
        ConfluxError::NotFound(NotFound::Task(id))
    }

    pub fn empty_capabilities() -> Self {
        ConfluxError::InvalidConfig(ConfigError::EmptyCapabilities)
    }

    pub fn invalid_weight(w: f64) -> Self {
        ConfluxError::InvalidEdge(EdgeError::InvalidWeight(w))
    }
}
