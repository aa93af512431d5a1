use async_trait::async_trait;

use super::AudioSource;
use crate::error::ResolveError;
use crate::track::Track;

/// Catalog search backed by an Invidious instance.
///
/// Resolution is two-step, like the upstream API: a text search picks the
/// best video match, then the video detail endpoint supplies the direct
/// audio stream URL from its adaptive formats.
pub struct InvidiousSource {
    client: reqwest::Client,
    instance: String,
}

impl InvidiousSource {
    pub fn new(instance: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            instance: instance.trim_end_matches('/').to_string(),
        }
    }

    fn provider_err(&self, message: impl std::fmt::Display) -> ResolveError {
        ResolveError::Provider {
            provider: "invidious".to_string(),
            message: message.to_string(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, ResolveError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.provider_err(err))?;

        if !response.status().is_success() {
            return Err(self.provider_err(format!("HTTP {}", response.status())));
        }

        response.json().await.map_err(|err| self.provider_err(err))
    }

    /// Highest-bitrate audio-only format URL, if any. Invidious reports
    /// bitrate as a decimal string on most instances and as a number on a
    /// few, so both are accepted.
    fn best_audio_url(formats: &serde_json::Value) -> Option<String> {
        formats
            .as_array()?
            .iter()
            .filter(|f| {
                f["type"]
                    .as_str()
                    .map(|t| t.starts_with("audio/"))
                    .unwrap_or(false)
            })
            .max_by_key(|f| {
                f["bitrate"]
                    .as_str()
                    .and_then(|b| b.parse::<u64>().ok())
                    .or_else(|| f["bitrate"].as_u64())
                    .unwrap_or(0)
            })
            .and_then(|f| f["url"].as_str())
            .map(str::to_string)
    }
}

#[async_trait]
impl AudioSource for InvidiousSource {
    fn name(&self) -> &'static str {
        "invidious"
    }

    fn can_handle(&self, _query: &str) -> bool {
        false
    }

    async fn resolve(&self, query: &str) -> Result<Track, ResolveError> {
        let search_url = format!(
            "{}/api/v1/search?q={}&type=video",
            self.instance,
            urlencoding::encode(query)
        );
        let results = self.get_json(&search_url).await?;

        let first = results
            .as_array()
            .and_then(|arr| arr.iter().find(|r| r["type"] == "video"))
            .ok_or_else(|| ResolveError::NotFound {
                query: query.to_string(),
            })?;

        let video_id = first["videoId"]
            .as_str()
            .ok_or_else(|| ResolveError::NotFound {
                query: query.to_string(),
            })?;
        let title = first["title"].as_str().unwrap_or("Unknown").to_string();
        let author = first["author"].as_str().unwrap_or("Unknown").to_string();
        let duration_ms = first["lengthSeconds"].as_u64().unwrap_or(0) * 1000;
        let artwork_url = first["videoThumbnails"]
            .as_array()
            .and_then(|thumbs| thumbs.last())
            .and_then(|t| t["url"].as_str())
            .map(str::to_string);

        let detail_url = format!("{}/api/v1/videos/{}", self.instance, video_id);
        let detail = self.get_json(&detail_url).await?;

        let stream_url = Self::best_audio_url(&detail["adaptiveFormats"])
            .ok_or(ResolveError::StreamUnavailable {
                title: title.clone(),
            })?;

        Ok(Track {
            stream_url,
            title,
            author,
            album: None,
            artwork_url,
            duration_ms,
            source_name: "invidious".to_string(),
        })
    }
}
