//! Directory page discovery
//!
//! The directory page lists every channel as a card element carrying the
//! stream path, title and tags as `data-*` attributes, with the logo in a
//! nested `<img>`.

use std::collections::HashSet;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{SourceError, SourceResult};
use crate::models::ChannelDescriptor;
use crate::utils::UrlUtils;

pub struct DirectoryScraper {
    client: Client,
    url: String,
    card_selector: String,
}

impl DirectoryScraper {
    pub fn new<U: Into<String>, S: Into<String>>(client: Client, url: U, card_selector: S) -> Self {
        Self {
            client,
            url: url.into(),
            card_selector: card_selector.into(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            config.directory.url.clone(),
            config.directory.channel_card_selector.clone(),
        )
    }

    /// Fetch and parse the directory in one step
    pub async fn discover(&self) -> SourceResult<Vec<ChannelDescriptor>> {
        info!("Fetching main channel list from {}", self.url);
        let html = self.fetch_page().await?;
        let channels = self.parse_channels(&html)?;
        info!("Found {} channels in directory", channels.len());
        Ok(channels)
    }

    pub async fn fetch_page(&self) -> SourceResult<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&self.url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(&self.url, &e))
    }

    /// Extract channel descriptors from directory markup.
    ///
    /// Cards without a stream path are skipped and repeated stream paths
    /// keep their first card, so every returned descriptor has a unique,
    /// non-empty key.
    pub fn parse_channels(&self, html: &str) -> SourceResult<Vec<ChannelDescriptor>> {
        let card_selector = parse_selector(&self.card_selector)?;
        let img_selector = parse_selector("img")?;
        let document = Html::parse_document(html);

        let mut channels = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        for (idx, card) in document.select(&card_selector).enumerate() {
            let attrs = card.value();
            let stream_path = attrs.attr("data-stream").unwrap_or("").trim();
            if stream_path.is_empty() {
                skipped += 1;
                continue;
            }
            if !seen.insert(stream_path.to_string()) {
                debug!("Skipping duplicate channel card for stream '{}'", stream_path);
                continue;
            }

            let img = card.select(&img_selector).next();
            let logo = img
                .and_then(|img| img.value().attr("src"))
                .map(|src| UrlUtils::absolutize(&self.url, src))
                .unwrap_or_default();

            let mut name = attrs.attr("data-title").unwrap_or("").trim().to_string();
            if name.is_empty() {
                name = img
                    .and_then(|img| img.value().attr("alt"))
                    .map(|alt| alt.trim().to_string())
                    .filter(|alt| !alt.is_empty())
                    .unwrap_or_else(|| format!("Channel {}", idx + 1));
            }

            channels.push(
                ChannelDescriptor::new(stream_path)
                    .with_name(name)
                    .with_logo(logo)
                    .with_tags(attrs.attr("data-tags").unwrap_or("").trim()),
            );
        }

        if skipped > 0 {
            warn!("Skipped {} channel cards without a stream path", skipped);
        }

        Ok(channels)
    }
}

fn parse_selector(selector: &str) -> SourceResult<Selector> {
    Selector::parse(selector).map_err(|e| SourceError::ParseError {
        message: format!("Invalid selector '{selector}': {e}"),
    })
}
