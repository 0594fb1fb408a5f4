//! Playlist assembly and rendering
//!
//! Joins resolved channels with their registry numbers and renders the two
//! artifacts: a JSON document for machines and an extended M3U for players.
//! Both list channels in ascending channel number order.

pub mod writer;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use crate::config::PlaylistConfig;
use crate::errors::AppResult;
use crate::models::{PlaylistChannel, ResolvedChannel};
use crate::registry::ChannelNumberRegistry;

pub use writer::{ArtifactReport, write_artifact};

#[derive(Debug, Serialize)]
struct PlaylistDocument<'a> {
    generated_at: DateTime<Utc>,
    channels: &'a [PlaylistChannel],
}

pub struct PlaylistAssembler {
    default_group: String,
    header_comments: Vec<String>,
}

impl PlaylistAssembler {
    pub fn new(config: &PlaylistConfig) -> Self {
        Self {
            default_group: config.default_group.clone(),
            header_comments: config.header_comments.clone(),
        }
    }

    /// Number every resolved channel and sort by number.
    ///
    /// Must only be called once resolution has finished: this is where
    /// numbers are allocated, in the order channels are given.
    pub fn assemble(
        &self,
        resolved: Vec<ResolvedChannel>,
        registry: &mut ChannelNumberRegistry,
    ) -> Vec<PlaylistChannel> {
        let mut channels = Vec::with_capacity(resolved.len());

        for channel in resolved {
            let descriptor = channel.descriptor;
            let allocation = match registry.allocate_or_get(&descriptor.stream_path) {
                Ok(allocation) => allocation,
                Err(e) => {
                    error!(
                        "Dropping {} ({}): {}",
                        descriptor.display_name(),
                        descriptor.stream_path,
                        e
                    );
                    continue;
                }
            };

            let name = if descriptor.name.is_empty() {
                descriptor.stream_path.clone()
            } else {
                descriptor.name
            };
            let group = match descriptor.tags.trim() {
                "" => self.default_group.clone(),
                tags => tags.to_string(),
            };

            channels.push(PlaylistChannel {
                channel_number: allocation.number,
                name,
                logo: descriptor.logo_url,
                group,
                url: channel.stream_url,
                stream_path: descriptor.stream_path,
            });
        }

        channels.sort_by_key(|c| c.channel_number);
        debug!("Assembled {} playlist channels", channels.len());
        channels
    }

    pub fn render_json(
        &self,
        channels: &[PlaylistChannel],
        generated_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let document = PlaylistDocument {
            generated_at,
            channels,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn render_m3u(&self, channels: &[PlaylistChannel], generated_at: DateTime<Utc>) -> String {
        let mut m3u = String::from("#EXTM3U\n");
        for comment in &self.header_comments {
            m3u.push_str(&format!("# {}\n", comment));
        }
        m3u.push_str(&format!(
            "# Generated at {}\n\n",
            generated_at.format("%a %b %e %H:%M:%S %Y UTC")
        ));

        for channel in channels {
            // Commas would end the EXTINF attribute section early
            let name = channel.name.replace(',', " ");
            m3u.push_str(&format!(
                "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\" tvg-logo=\"{}\" tvg-chno=\"{}\" group-title=\"{}\",{}\n{}\n",
                name, name, channel.logo, channel.channel_number, channel.group, name, channel.url
            ));
        }

        m3u
    }
}
