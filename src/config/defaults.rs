/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Directory defaults
pub const DEFAULT_DIRECTORY_URL: &str = "http://tv.roarzone.info/";
pub const DEFAULT_PLAYER_URL_TEMPLATE: &str = "http://tv.roarzone.info/player.php?stream={stream}";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_CHANNEL_CARD_SELECTOR: &str = "div.channel-card";

/// Placeholder substituted with the stream path
pub const STREAM_PLACEHOLDER: &str = "{stream}";

// Resolution defaults
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 75;
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub const DEFAULT_STREAM_PATTERN: &str = r#"https?://[^\s"'<>]+\.m3u8[^\s"'<>]*"#;

// Storage defaults
pub const DEFAULT_CHANNEL_MAP_PATH: &str = "channel_map.json";
pub const DEFAULT_PLAYLIST_JSON_PATH: &str = "playlist.json";
pub const DEFAULT_PLAYLIST_M3U_PATH: &str = "playlist.m3u";

// Playlist defaults
pub const DEFAULT_GROUP: &str = "Uncategorized";
pub const DEFAULT_HEADER_COMMENT: &str = "Generated by iptv-scraper";
