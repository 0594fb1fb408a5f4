use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
}

/// Where channels are discovered and how their player pages are addressed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory page listing every channel card
    #[serde(default = "default_directory_url")]
    pub url: String,
    /// Per-channel player page; `{stream}` is replaced by the stream path
    #[serde(default = "default_player_url_template")]
    pub player_url_template: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// CSS selector matching one element per channel
    #[serde(default = "default_channel_card_selector")]
    pub channel_card_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Maximum number of player page fetches in flight at once
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    /// Total timeout applied to every HTTP request
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
    /// Regex locating the stream manifest URL in a player page; first match wins
    #[serde(default = "default_stream_pattern")]
    pub stream_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_channel_map_path")]
    pub channel_map_path: PathBuf,
    #[serde(default = "default_playlist_json_path")]
    pub playlist_json_path: PathBuf,
    #[serde(default = "default_playlist_m3u_path")]
    pub playlist_m3u_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    /// Group used when a channel carries no tags
    #[serde(default = "default_group")]
    pub default_group: String,
    /// Free-text comment lines written below `#EXTM3U`
    #[serde(default = "default_header_comments")]
    pub header_comments: Vec<String>,
}

fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

fn default_player_url_template() -> String {
    DEFAULT_PLAYER_URL_TEMPLATE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_channel_card_selector() -> String {
    DEFAULT_CHANNEL_CARD_SELECTOR.to_string()
}

fn default_concurrency_limit() -> usize {
    DEFAULT_CONCURRENCY_LIMIT
}

fn default_request_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_REQUEST_TIMEOUT).unwrap_or(Duration::from_secs(30))
}

fn default_stream_pattern() -> String {
    DEFAULT_STREAM_PATTERN.to_string()
}

fn default_channel_map_path() -> PathBuf {
    PathBuf::from(DEFAULT_CHANNEL_MAP_PATH)
}

fn default_playlist_json_path() -> PathBuf {
    PathBuf::from(DEFAULT_PLAYLIST_JSON_PATH)
}

fn default_playlist_m3u_path() -> PathBuf {
    PathBuf::from(DEFAULT_PLAYLIST_M3U_PATH)
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_header_comments() -> Vec<String> {
    vec![DEFAULT_HEADER_COMMENT.to_string()]
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: default_directory_url(),
            player_url_template: default_player_url_template(),
            user_agent: default_user_agent(),
            channel_card_selector: default_channel_card_selector(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            request_timeout: default_request_timeout(),
            stream_pattern: default_stream_pattern(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            channel_map_path: default_channel_map_path(),
            playlist_json_path: default_playlist_json_path(),
            playlist_m3u_path: default_playlist_m3u_path(),
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            default_group: default_group(),
            header_comments: default_header_comments(),
        }
    }
}

impl StorageConfig {
    /// Re-root every storage path under `dir`, keeping file names
    pub fn relocate(&mut self, dir: &Path) {
        for path in [
            &mut self.channel_map_path,
            &mut self.playlist_json_path,
            &mut self.playlist_m3u_path,
        ] {
            if let Some(name) = path.file_name() {
                *path = dir.join(name);
            }
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Reject settings the scraper cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.resolution.concurrency_limit == 0 {
            return Err(AppError::validation(
                "resolution.concurrency_limit must be at least 1",
            ));
        }
        if self.resolution.concurrency_limit > Semaphore::MAX_PERMITS {
            return Err(AppError::validation(format!(
                "resolution.concurrency_limit must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.resolution.request_timeout.is_zero() {
            return Err(AppError::validation(
                "resolution.request_timeout must be greater than zero",
            ));
        }
        if !self
            .directory
            .player_url_template
            .contains(STREAM_PLACEHOLDER)
        {
            return Err(AppError::configuration(format!(
                "directory.player_url_template must contain '{STREAM_PLACEHOLDER}'"
            )));
        }
        url::Url::parse(&self.directory.url).map_err(|e| {
            AppError::configuration(format!(
                "directory.url '{}' is not a valid URL: {e}",
                self.directory.url
            ))
        })?;
        Regex::new(&self.resolution.stream_pattern).map_err(|e| {
            AppError::configuration(format!("resolution.stream_pattern is invalid: {e}"))
        })?;
        Ok(())
    }
}
