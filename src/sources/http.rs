use async_trait::async_trait;

use super::AudioSource;
use crate::error::ResolveError;
use crate::track::Track;

/// Direct HTTP(S) link playback. Claims anything that looks like a URL,
/// probes it, and hands the URL straight through as the stream locator.
/// Duration is unknown for arbitrary streams, so it stays 0 and the renderer
/// skips percentage math.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Best-effort display title: the last path segment, percent-decoded.
    /// URLs with no path beyond the host fall back to a generic title.
    fn title_from_url(url: &str) -> String {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let without_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
        let Some((_, path_part)) = without_scheme.trim_end_matches('/').split_once('/') else {
            return "Stream".to_string();
        };
        let segment = path_part.rsplit('/').next().unwrap_or("");
        if segment.is_empty() {
            return "Stream".to_string();
        }
        urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string())
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn can_handle(&self, query: &str) -> bool {
        query.starts_with("http://") || query.starts_with("https://")
    }

    async fn resolve(&self, query: &str) -> Result<Track, ResolveError> {
        if !self.can_handle(query) {
            return Err(ResolveError::NotFound {
                query: query.to_string(),
            });
        }

        let title = Self::title_from_url(query);

        // Probe with HEAD so we fail fast on dead links instead of at
        // playback start.
        let response = self
            .client
            .head(query)
            .send()
            .await
            .map_err(|err| ResolveError::Provider {
                provider: "http".to_string(),
                message: err.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ResolveError::StreamUnavailable { title });
        }

        Ok(Track {
            stream_url: query.to_string(),
            title,
            author: "Unknown".to_string(),
            album: None,
            artwork_url: None,
            duration_ms: 0,
            source_name: "http".to_string(),
        })
    }
}
