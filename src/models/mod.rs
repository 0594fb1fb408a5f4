//! Channel data carried through a scrape run
//!
//! A channel moves through three shapes: a [`ChannelDescriptor`] as found on
//! the directory page, a [`ResolvedChannel`] once its player page yielded a
//! stream URL, and a [`PlaylistChannel`] once the registry numbered it.

use serde::{Deserialize, Serialize};

/// Channel metadata discovered on the directory page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    /// Unique key of the channel; also the registry key
    pub stream_path: String,
    pub name: String,
    pub logo_url: String,
    pub tags: String,
}

impl ChannelDescriptor {
    pub fn new<S: Into<String>>(stream_path: S) -> Self {
        Self {
            stream_path: stream_path.into(),
            name: String::new(),
            logo_url: String::new(),
            tags: String::new(),
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_logo<S: Into<String>>(mut self, logo_url: S) -> Self {
        self.logo_url = logo_url.into();
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: S) -> Self {
        self.tags = tags.into();
        self
    }

    /// Name for log lines, falling back to the stream path
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.stream_path
        } else {
            &self.name
        }
    }
}

/// A descriptor whose stream manifest URL was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub descriptor: ChannelDescriptor,
    pub stream_url: String,
}

/// A resolved channel with its permanent channel number
///
/// Serialized as one record of the JSON playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistChannel {
    pub channel_number: u64,
    pub name: String,
    pub logo: String,
    pub group: String,
    pub url: String,
    pub stream_path: String,
}

/// Outcome of one registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub number: u64,
    /// True when the number was assigned by this call
    pub newly_assigned: bool,
}
