//! Bounded fan-out/fan-in over a [`StreamResolver`]
//!
//! One task is spawned per descriptor; a semaphore admits at most
//! `concurrency_limit` of them into the resolver at a time. The call returns
//! only once every task has finished, so nothing is still in flight when the
//! caller moves on to channel numbering.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::errors::{AppError, AppResult, ResolveError};
use crate::models::{ChannelDescriptor, ResolvedChannel};
use crate::sources::StreamResolver;

/// Result of resolving a whole batch
#[derive(Debug, Default)]
pub struct ResolutionOutcome {
    /// Successfully resolved channels, in input order
    pub resolved: Vec<ResolvedChannel>,
    /// Descriptors dropped because their resolution failed
    pub failed: usize,
}

impl ResolutionOutcome {
    pub fn total(&self) -> usize {
        self.resolved.len() + self.failed
    }
}

enum TaskResult {
    Resolved(String),
    Failed(ResolveError),
    Panicked(String),
}

pub struct BoundedResolutionPipeline<R: ?Sized> {
    resolver: Arc<R>,
    concurrency_limit: usize,
}

impl<R> BoundedResolutionPipeline<R>
where
    R: StreamResolver + ?Sized + 'static,
{
    pub fn new(resolver: Arc<R>, concurrency_limit: usize) -> AppResult<Self> {
        if concurrency_limit == 0 {
            return Err(AppError::validation("concurrency limit must be at least 1"));
        }
        if concurrency_limit > Semaphore::MAX_PERMITS {
            return Err(AppError::validation(format!(
                "concurrency limit must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(Self {
            resolver,
            concurrency_limit,
        })
    }

    /// Resolve every descriptor exactly once.
    ///
    /// Failures (including panics inside the resolver) are logged with the
    /// channel they belong to and counted; they never affect sibling tasks.
    pub async fn resolve_all(&self, descriptors: Vec<ChannelDescriptor>) -> ResolutionOutcome {
        let total = descriptors.len();
        let started = Instant::now();
        info!(
            "Starting concurrent token extraction for {} channels ({} workers)",
            total, self.concurrency_limit
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut tasks = JoinSet::new();

        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let resolver = Arc::clone(&self.resolver);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition cannot fail
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, descriptor, TaskResult::Failed(ResolveError::Cancelled));
                };

                let result = AssertUnwindSafe(resolver.resolve(&descriptor))
                    .catch_unwind()
                    .await;

                let result = match result {
                    Ok(Ok(stream_url)) => TaskResult::Resolved(stream_url),
                    Ok(Err(e)) => TaskResult::Failed(e),
                    Err(panic) => TaskResult::Panicked(panic_message(panic.as_ref())),
                };
                (index, descriptor, result)
            });
        }

        let mut resolved = Vec::with_capacity(total);
        let mut failed = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, descriptor, TaskResult::Resolved(stream_url))) => {
                    debug!("[OK] {} -> {}", descriptor.display_name(), stream_url);
                    resolved.push((
                        index,
                        ResolvedChannel {
                            descriptor,
                            stream_url,
                        },
                    ));
                }
                Ok((_, descriptor, TaskResult::Failed(e))) => {
                    failed += 1;
                    warn!(
                        kind = e.kind(),
                        "[ERR] {} ({}): {}",
                        descriptor.display_name(),
                        descriptor.stream_path,
                        e
                    );
                }
                Ok((_, descriptor, TaskResult::Panicked(message))) => {
                    failed += 1;
                    error!(
                        "[EXC] Resolver panicked for {} ({}): {}",
                        descriptor.display_name(),
                        descriptor.stream_path,
                        message
                    );
                }
                Err(join_error) => {
                    failed += 1;
                    error!("[EXC] Resolution task did not complete: {}", join_error);
                }
            }
        }

        resolved.sort_by_key(|(index, _)| *index);
        let resolved: Vec<ResolvedChannel> = resolved.into_iter().map(|(_, c)| c).collect();

        info!(
            "Scraping complete. Found {} valid streams out of {} in {}",
            resolved.len(),
            total,
            humantime::format_duration(std::time::Duration::from_millis(
                started.elapsed().as_millis() as u64
            ))
        );

        ResolutionOutcome { resolved, failed }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
