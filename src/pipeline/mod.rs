//! Resolution pipeline
//!
//! Drives stream resolution for a whole directory under a fixed worker
//! budget. See [`resolution::BoundedResolutionPipeline`].

pub mod resolution;

pub use resolution::{BoundedResolutionPipeline, ResolutionOutcome};
