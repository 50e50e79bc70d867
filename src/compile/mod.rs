//! Compilation of a pipeline definition into a Concourse document

pub mod closure;
pub mod columns;
mod cycles;
pub mod document;
pub mod groups;
pub mod passed;
pub mod resources;

pub use closure::Closure;
pub use columns::Columns;
pub use document::assemble;
pub use groups::ALL_JOBS_GROUP;
pub use resources::ResourceSet;
