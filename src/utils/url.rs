//! URL helpers for directory and player pages

use url::Url;

use crate::config::defaults::STREAM_PLACEHOLDER;

pub struct UrlUtils;

impl UrlUtils {
    /// Make a possibly relative asset reference absolute against `base`.
    ///
    /// Empty references stay empty; references that cannot be joined are
    /// returned unchanged.
    pub fn absolutize(base: &str, reference: &str) -> String {
        let reference = reference.trim();
        if reference.is_empty() || reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        Url::parse(base)
            .and_then(|base| base.join(reference))
            .map(|joined| joined.to_string())
            .unwrap_or_else(|_| reference.to_string())
    }

    /// Player page URL for a stream path.
    ///
    /// The path is substituted as written on the directory page; it is
    /// already in URL form there and must not be encoded a second time.
    pub fn player_url(template: &str, stream_path: &str) -> String {
        template.replace(STREAM_PLACEHOLDER, stream_path)
    }
}
