//! Channel sources
//!
//! - [`directory`]: discovers channel descriptors on the directory page
//! - [`player`]: resolves a descriptor's stream manifest URL from its player page
//! - [`traits`]: the [`StreamResolver`] seam the resolution pipeline drives

pub mod directory;
pub mod player;
pub mod traits;

pub use directory::DirectoryScraper;
pub use player::StreamTokenResolver;
pub use traits::*;
