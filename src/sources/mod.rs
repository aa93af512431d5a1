use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

pub mod http;
pub mod invidious;

pub use http::HttpSource;
pub use invidious::InvidiousSource;

use crate::config::Config;
use crate::error::ResolveError;
use crate::track::Track;

/// Trait implemented by every catalog / stream source.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Unique identifier for this source (e.g. "http", "invidious").
    fn name(&self) -> &'static str;

    /// Whether this source claims the query outright (direct links).
    /// Search sources return false and are tried in priority order instead.
    fn can_handle(&self, query: &str) -> bool;

    /// Resolve a free-text query or link into a playable track.
    /// Must yield a stream locator, not just metadata.
    async fn resolve(&self, query: &str) -> Result<Track, ResolveError>;
}

/// Holds all enabled sources in fixed priority order and walks them until
/// one yields a playable stream locator.
pub struct SourceManager {
    sources: Vec<Box<dyn AudioSource>>,
    timeout: Duration,
}

impl SourceManager {
    pub fn new(config: &Config) -> Self {
        let mut sources: Vec<Box<dyn AudioSource>> = Vec::new();

        macro_rules! register_source {
            ($enabled:expr, $name:literal, $ctor:expr) => {
                if $enabled {
                    sources.push(Box::new($ctor));
                    tracing::info!("Loaded source: {}", $name);
                }
            };
        }

        register_source!(config.sources.http, "HTTP", HttpSource::new());
        register_source!(
            config.sources.invidious,
            "Invidious",
            InvidiousSource::new(config.sources.invidious_instance.clone())
        );

        Self {
            sources,
            timeout: Duration::from_millis(config.player.resolve_timeout_ms),
        }
    }

    pub(crate) fn with_sources(sources: Vec<Box<dyn AudioSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    /// Resolve `query` against the configured sources.
    ///
    /// Direct-link handlers short-circuit the priority walk. For search
    /// queries, the first source to produce a playable locator wins;
    /// `NotFound` from one source lets the next one try. The final error
    /// keeps the most informative failure seen: a match without a stream
    /// outranks a transient provider failure, which outranks "no match".
    pub async fn resolve(&self, query: &str) -> Result<Track, ResolveError> {
        if let Some(source) = self.sources.iter().find(|s| s.can_handle(query)) {
            return self.resolve_with(source.as_ref(), query).await;
        }

        let mut stream_unavailable: Option<ResolveError> = None;
        let mut provider_failure: Option<ResolveError> = None;

        for source in &self.sources {
            match self.resolve_with(source.as_ref(), query).await {
                Ok(track) => {
                    debug!(source = source.name(), title = %track.title, "resolved");
                    return Ok(track);
                }
                Err(err @ ResolveError::StreamUnavailable { .. }) => {
                    warn!(source = source.name(), %err, "match without stream");
                    stream_unavailable.get_or_insert(err);
                }
                Err(err @ ResolveError::Provider { .. }) => {
                    warn!(source = source.name(), %err, "provider failure");
                    provider_failure.get_or_insert(err);
                }
                Err(ResolveError::NotFound { .. }) => {}
            }
        }

        Err(stream_unavailable
            .or(provider_failure)
            .unwrap_or_else(|| ResolveError::NotFound {
                query: query.to_string(),
            }))
    }

    async fn resolve_with(
        &self,
        source: &dyn AudioSource,
        query: &str,
    ) -> Result<Track, ResolveError> {
        match tokio::time::timeout(self.timeout, source.resolve(query)).await {
            Ok(result) => result,
            Err(_) => Err(ResolveError::Provider {
                provider: source.name().to_string(),
                message: format!("timed out after {:?}", self.timeout),
            }),
        }
    }
}
