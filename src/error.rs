//! Error types for pipeline compilation

use std::fmt;
use thiserror::Error;

/// Result type for compile operations
pub type Result<T, E = CompileError> = std::result::Result<T, E>;

/// Defects in how the pipeline was put together by the authoring layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("Resource '{0}' is not registered")]
    UnregisteredResource(String),

    #[error("Job '{0}' is not part of the pipeline")]
    UnregisteredJob(String),

    #[error("Resource '{0}' is already registered with a different declaration")]
    ConflictingResource(String),

    #[error("Failed to encode Dockerfile steps of image '{0}': {1}")]
    Encoding(String, String),
}

/// Which graph a cycle was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Job predecessor graph (explicit and implicit edges)
    Jobs,
    /// Group `before` relation
    Groups,
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleKind::Jobs => write!(f, "jobs"),
            CycleKind::Groups => write!(f, "groups"),
        }
    }
}

/// A dependency cycle, with the names of every participant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cycle detected between {kind}: {}", .members.join(", "))]
pub struct CycleError {
    pub kind: CycleKind,
    /// Participants, sorted by name
    pub members: Vec<String>,
}

impl CycleError {
    pub fn new(kind: CycleKind, mut members: Vec<String>) -> Self {
        members.sort();
        members.dedup();
        Self { kind, members }
    }
}

/// Any failure of a top-level compile
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Serialization(#[from] serde_yaml::Error),

    #[error("Failed to write pipeline: {0}")]
    Io(#[from] std::io::Error),
}
