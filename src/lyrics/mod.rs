use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::debug;

pub mod lrclib;

pub use lrclib::LrcLibProvider;

use crate::config::Config;
use crate::track::Track;

/// One timed lyric line.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LyricLine {
    pub timestamp_ms: u64,
    pub text: String,
}

/// Lyrics for one track, lines sorted ascending by timestamp.
///
/// Derived once per track and discarded when the track changes. Unsynced
/// lyrics are wrapped as a single zero-timestamp entry with `synced: false`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LyricSheet {
    pub provider: String,
    pub synced: bool,
    pub lines: Vec<LyricLine>,
}

impl LyricSheet {
    pub fn plain(provider: impl Into<String>, text: String) -> Self {
        Self {
            provider: provider.into(),
            synced: false,
            lines: vec![LyricLine {
                timestamp_ms: 0,
                text,
            }],
        }
    }
}

/// Trait implemented by every lyrics provider. "Not found" is `None`,
/// never an error.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load(&self, track: &Track) -> Option<LyricSheet>;
}

/// Races all enabled providers, preferring the first synced sheet and
/// falling back to the first plain one.
pub struct LyricsManager {
    providers: Vec<Arc<dyn LyricsProvider>>,
    timeout: Duration,
}

impl LyricsManager {
    pub fn new(config: &Config) -> Self {
        let mut providers: Vec<Arc<dyn LyricsProvider>> = Vec::new();

        macro_rules! register_provider {
            ($enabled:expr, $name:literal, $ctor:expr) => {
                if $enabled {
                    providers.push(Arc::new($ctor));
                    tracing::info!("Loaded lyrics provider: {}", $name);
                }
            };
        }

        register_provider!(config.lyrics.lrclib, "LRCLIB", LrcLibProvider::new());

        Self {
            providers,
            timeout: Duration::from_millis(config.player.lyrics_timeout_ms),
        }
    }

    pub(crate) fn with_providers(
        providers: Vec<Arc<dyn LyricsProvider>>,
        timeout: Duration,
    ) -> Self {
        Self { providers, timeout }
    }

    pub async fn load(&self, track: &Track) -> Option<LyricSheet> {
        let mut futures = FuturesUnordered::new();

        for provider in &self.providers {
            let provider = provider.clone();
            let track = track.clone();
            let timeout = self.timeout;
            futures.push(async move {
                match tokio::time::timeout(timeout, provider.load(&track)).await {
                    Ok(sheet) => sheet,
                    Err(_) => {
                        debug!(provider = provider.name(), "lyrics lookup timed out");
                        None
                    }
                }
            });
        }

        let mut fallback: Option<LyricSheet> = None;

        while let Some(result) = futures.next().await {
            if let Some(sheet) = result {
                if sheet.synced {
                    return Some(sheet);
                }
                if fallback.is_none() {
                    fallback = Some(sheet);
                }
            }
        }

        fallback
    }
}

/// Forward-only cursor over a sorted lyric line set.
///
/// Retained across renderer ticks for the lifetime of one track, so each
/// tick resumes where the last one left off instead of re-scanning.
#[derive(Debug, Default)]
pub struct LyricCursor {
    index: Option<usize>,
}

impl LyricCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the cursor to the latest line whose timestamp is at or before
    /// `elapsed_ms`. Never moves backwards.
    pub fn advance(&mut self, lines: &[LyricLine], elapsed_ms: u64) -> Option<usize> {
        let mut next = self.index.map_or(0, |i| i + 1);
        while next < lines.len() && lines[next].timestamp_ms <= elapsed_ms {
            self.index = Some(next);
            next += 1;
        }
        self.index
    }

    pub fn current(&self) -> Option<usize> {
        self.index
    }
}
