//! One scrape run, end to end
//!
//! Phases run strictly in sequence: discover the directory, resolve every
//! channel concurrently, then (only once resolution has drained) number the
//! channels against the persisted registry and write the artifacts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info};

use crate::config::Config;
use crate::errors::AppResult;
use crate::models::ChannelDescriptor;
use crate::pipeline::BoundedResolutionPipeline;
use crate::playlist::writer::write_logged;
use crate::playlist::{ArtifactReport, PlaylistAssembler};
use crate::registry::RegistryStore;
use crate::sources::{DirectoryScraper, StreamResolver, StreamTokenResolver};
use crate::utils::build_http_client;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub discovered: usize,
    pub resolved: usize,
    pub failed: usize,
    pub new_assignments: usize,
    pub registry_saved: bool,
    pub artifacts: ArtifactReport,
    pub elapsed: Duration,
}

pub struct ScrapeJob {
    config: Config,
}

impl ScrapeJob {
    pub fn new(config: Config) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Full run against the configured directory.
    ///
    /// Fails only when the directory cannot be fetched or parsed; every
    /// later failure is logged and reflected in the summary.
    pub async fn run(&self) -> AppResult<RunSummary> {
        let started = Instant::now();
        let client = build_http_client(&self.config)?;

        let directory = DirectoryScraper::from_config(client.clone(), &self.config);
        let descriptors = directory.discover().await?;

        let resolver = Arc::new(StreamTokenResolver::from_config(client, &self.config)?);
        let pipeline =
            BoundedResolutionPipeline::new(resolver, self.config.resolution.concurrency_limit)?;

        Ok(self.process(descriptors, &pipeline, started).await)
    }

    /// Resolve, number and emit an already discovered channel list
    pub async fn process<R>(
        &self,
        descriptors: Vec<ChannelDescriptor>,
        pipeline: &BoundedResolutionPipeline<R>,
        started: Instant,
    ) -> RunSummary
    where
        R: StreamResolver + ?Sized + 'static,
    {
        let discovered = descriptors.len();
        let outcome = pipeline.resolve_all(descriptors).await;
        let resolved = outcome.resolved.len();

        // Resolution has fully drained; numbering is single-threaded from here.
        let store = RegistryStore::new(&self.config.storage.channel_map_path);
        let mut registry = store.load().await;

        let assembler = PlaylistAssembler::new(&self.config.playlist);
        let channels = assembler.assemble(outcome.resolved, &mut registry);

        let registry_saved = match store.save_if_changed(&registry).await {
            Ok(saved) => saved,
            Err(e) => {
                error!("Failed to write channel map: {}", e);
                false
            }
        };

        let generated_at = Utc::now();
        let json_written = match assembler.render_json(&channels, generated_at) {
            Ok(json) => {
                write_logged("JSON playlist", &self.config.storage.playlist_json_path, &json).await
            }
            Err(e) => {
                error!("Failed to render JSON playlist: {}", e);
                false
            }
        };
        let m3u = assembler.render_m3u(&channels, generated_at);
        let m3u_written =
            write_logged("M3U playlist", &self.config.storage.playlist_m3u_path, &m3u).await;

        let summary = RunSummary {
            discovered,
            resolved,
            failed: outcome.failed,
            new_assignments: registry.new_assignments(),
            registry_saved,
            artifacts: ArtifactReport {
                json_written,
                m3u_written,
            },
            elapsed: started.elapsed(),
        };

        info!(
            "Run finished: {} discovered, {} resolved, {} failed, {} newly numbered",
            summary.discovered, summary.resolved, summary.failed, summary.new_assignments
        );
        info!(
            "Total execution time: {}",
            humantime::format_duration(Duration::from_millis(summary.elapsed.as_millis() as u64))
        );

        summary
    }
}
