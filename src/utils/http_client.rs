use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tracing::debug;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Build the single HTTP client shared by the directory fetch and every
/// resolution task.
///
/// The client carries a browser user agent and a `Referer` pointing at the
/// directory page, which player pages expect before handing out tokens.
pub fn build_http_client(config: &Config) -> AppResult<Client> {
    build_client(
        &config.directory.user_agent,
        &config.directory.url,
        config.resolution.request_timeout,
    )
}

pub fn build_client(user_agent: &str, referer: &str, timeout: Duration) -> AppResult<Client> {
    let mut headers = HeaderMap::new();
    let referer = HeaderValue::from_str(referer)
        .map_err(|e| AppError::configuration(format!("Invalid referer header '{referer}': {e}")))?;
    headers.insert(REFERER, referer);

    debug!("Building HTTP client with {:?} timeout", timeout);

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_from_default_config() {
        assert!(build_http_client(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_unprintable_referer() {
        let result = build_client("agent", "http://bad\nreferer", Duration::from_secs(1));
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
