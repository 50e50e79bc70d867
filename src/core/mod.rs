//! Core domain models for pipeline definitions
//!
//! This module defines the jobs, steps, resources and registries a pipeline
//! is authored from, and the YAML configuration that builds them.

pub mod config;
pub mod job;
pub mod names;
pub mod pipeline;
pub mod registry;
pub mod resource;
pub mod scope;
pub mod step;

pub use job::*;
pub use pipeline::*;
pub use registry::*;
pub use resource::*;
pub use scope::*;
pub use step::*;
