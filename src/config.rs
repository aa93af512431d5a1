use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub lyrics: LyricsConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Tick interval of the now-playing renderer.
    pub render_interval_ms: u64,
    /// Timeout for one source's resolution attempt; timeouts count as
    /// transient provider failures.
    pub resolve_timeout_ms: u64,
    /// Timeout for one lyrics provider; timeouts degrade to "no lyrics".
    pub lyrics_timeout_ms: u64,
    /// After this many consecutive unplayable queue entries the queue is
    /// abandoned instead of looping forever.
    pub max_consecutive_failures: u32,
    pub history_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: 1_000,
            resolve_timeout_ms: 10_000,
            lyrics_timeout_ms: 5_000,
            max_consecutive_failures: 3,
            history_capacity: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub http: bool,
    pub invidious: bool,
    pub invidious_instance: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            http: true,
            invidious: true,
            invidious_instance: "https://yewtu.be".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub lrclib: bool,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self { lrclib: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub filters: Option<String>,
}

impl Config {
    /// Load `config.toml` from the working directory. A missing file falls
    /// back to defaults; a malformed one is an error.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = match std::fs::read_to_string("config.toml") {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!("config.toml not found, using defaults");
                return Ok(Self::default());
            }
        };
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.player.max_consecutive_failures, 3);
        assert_eq!(config.player.history_capacity, 50);
        assert!(config.sources.invidious);
        assert!(config.lyrics.lrclib);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [player]
            render_interval_ms = 250

            [sources]
            invidious_instance = "https://invidious.example"
            "#,
        )
        .unwrap();
        assert_eq!(config.player.render_interval_ms, 250);
        assert_eq!(config.player.resolve_timeout_ms, 10_000);
        assert_eq!(config.sources.invidious_instance, "https://invidious.example");
        assert!(config.sources.http);
    }
}
