//! Player page stream token resolver
//!
//! Every channel has a player page whose body embeds a short-lived,
//! token-bearing HLS manifest URL. This resolver fetches that page once and
//! pulls the manifest URL out with a regex.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, trace};

use super::traits::StreamResolver;
use crate::config::Config;
use crate::errors::{AppError, AppResult, ResolveError};
use crate::models::ChannelDescriptor;
use crate::utils::UrlUtils;

pub struct StreamTokenResolver {
    client: Client,
    player_url_template: String,
    pattern: Regex,
}

impl StreamTokenResolver {
    pub fn new<S: Into<String>>(
        client: Client,
        player_url_template: S,
        stream_pattern: &str,
    ) -> AppResult<Self> {
        let pattern = Regex::new(stream_pattern).map_err(|e| {
            AppError::configuration(format!("Invalid stream pattern '{stream_pattern}': {e}"))
        })?;
        Ok(Self {
            client,
            player_url_template: player_url_template.into(),
            pattern,
        })
    }

    pub fn from_config(client: Client, config: &Config) -> AppResult<Self> {
        Self::new(
            client,
            config.directory.player_url_template.clone(),
            &config.resolution.stream_pattern,
        )
    }

    pub fn player_url(&self, stream_path: &str) -> String {
        UrlUtils::player_url(&self.player_url_template, stream_path)
    }

    /// First manifest URL in body order, if any.
    // NOTE: pages embedding several manifests resolve to whichever appears first.
    pub fn extract_stream_url(&self, body: &str) -> Option<String> {
        self.pattern.find(body).map(|m| m.as_str().to_string())
    }
}

#[async_trait]
impl StreamResolver for StreamTokenResolver {
    async fn resolve(&self, descriptor: &ChannelDescriptor) -> Result<String, ResolveError> {
        if descriptor.stream_path.is_empty() {
            return Err(ResolveError::MissingStreamPath);
        }

        let url = self.player_url(&descriptor.stream_path);
        trace!("Fetching player page for '{}': {}", descriptor.display_name(), url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::from_reqwest(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::from_reqwest(&url, &e))?;

        match self.extract_stream_url(&body) {
            Some(stream_url) => {
                debug!("Found token for '{}'", descriptor.display_name());
                Ok(stream_url)
            }
            None => Err(ResolveError::NoManifest { url }),
        }
    }
}
