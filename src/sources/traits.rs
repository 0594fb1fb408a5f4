//! Source trait definitions
//!
//! The resolution pipeline only depends on [`StreamResolver`], so tests can
//! drive it with instrumented resolvers instead of a live player site.

use async_trait::async_trait;

use crate::errors::ResolveError;
use crate::models::ChannelDescriptor;

/// Turns one channel descriptor into a playable stream URL
///
/// Implementations must be safe to call concurrently from independent tasks
/// and must not retry: one call is one attempt.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    async fn resolve(&self, descriptor: &ChannelDescriptor) -> Result<String, ResolveError>;
}
