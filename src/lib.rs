//! concourse-builder - compile declared CI jobs into Concourse pipelines

pub mod cli;
pub mod compile;
pub mod core;
pub mod error;
pub mod library;
pub mod model;
pub mod template;

// Re-export commonly used types
pub use crate::core::config::PipelineConfig;
pub use crate::core::{
    AllJobsGroup, Job, JobGroup, JobResource, Location, Pipeline, PutStep, Resource,
    ResourceRegistry, ResourceType, ScopeInfo, Step, TaskStep,
};
pub use compile::{Closure, Columns};
pub use error::{CompileError, ConstructionError, CycleError, CycleKind};
