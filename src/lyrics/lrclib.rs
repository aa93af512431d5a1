use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::{LyricLine, LyricSheet, LyricsProvider};
use crate::track::Track;

const API_BASE: &str = "https://lrclib.net/api";

/// Duration slack when matching search candidates against the playing track.
const DURATION_TOLERANCE_MS: i64 = 3_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LrcLibEntry {
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub artist_name: String,
    /// Seconds, as reported by the API.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub instrumental: bool,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
}

pub struct LrcLibProvider {
    client: reqwest::Client,
}

impl LrcLibProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Strip upload-platform noise ("(Official Video)", "- Topic", feat.
    /// tags) that throws off the text search.
    fn clean(text: &str, remove_feat: bool) -> String {
        let mut result = text.to_string();

        let patterns = [
            r#"(?i)\s*\([^)]*(?:official|lyrics?|video|audio|mv|visualizer|hd|4k)[^)]*\)"#,
            r#"(?i)\s*\[[^\]]*(?:official|lyrics?|video|audio|mv|visualizer|hd|4k)[^\]]*\]"#,
            r#"(?i)\s*-\s*Topic$"#,
            r#"(?i)VEVO$"#,
        ];

        for pattern in patterns {
            if let Ok(re) = Regex::new(pattern) {
                result = re.replace_all(&result, "").to_string();
            }
        }

        if remove_feat {
            if let Ok(re) = Regex::new(r#"(?i)\s*[(\[]\s*(?:ft\.?|feat\.?|featuring)\s+[^)\]]+[)\]]"#)
            {
                result = re.replace_all(&result, "").to_string();
            }
        }

        result.trim().to_string()
    }

    /// Parse LRC text into sorted timed lines. Malformed timestamp tags are
    /// discarded line by line rather than failing the whole sheet.
    pub(crate) fn parse_lrc(lrc: &str) -> Vec<LyricLine> {
        let Ok(re) = Regex::new(r#"\[(\d+):(\d{2})(?:\.(\d{2,3}))?\]"#) else {
            return Vec::new();
        };

        let mut lines = Vec::new();

        for raw_line in lrc.lines() {
            let mut times = Vec::new();
            for cap in re.captures_iter(raw_line) {
                let minutes: u64 = cap[1].parse().unwrap_or(0);
                let seconds: u64 = cap[2].parse().unwrap_or(0);
                let ms_str = cap.get(3).map_or("0", |m| m.as_str());
                let ms_padded = format!("{:0<3}", ms_str);
                let ms: u64 = ms_padded[..3].parse().unwrap_or(0);

                times.push(minutes * 60 * 1000 + seconds * 1000 + ms);
            }

            if times.is_empty() {
                continue;
            }
            let text = re.replace_all(raw_line, "").trim().to_string();
            if text.is_empty() {
                continue;
            }

            for timestamp_ms in times {
                lines.push(LyricLine {
                    timestamp_ms,
                    text: text.clone(),
                });
            }
        }

        lines.sort_by_key(|l| l.timestamp_ms);
        lines
    }

    /// Pick the search candidate whose duration is within tolerance of the
    /// playing track, skipping instrumentals; fall back to the first usable
    /// result when none match.
    pub(crate) fn select<'a>(
        candidates: &'a [LrcLibEntry],
        duration_ms: u64,
    ) -> Option<&'a LrcLibEntry> {
        candidates
            .iter()
            .find(|c| {
                !c.instrumental
                    && ((c.duration * 1000.0) as i64 - duration_ms as i64).abs()
                        <= DURATION_TOLERANCE_MS
            })
            .or_else(|| candidates.iter().find(|c| !c.instrumental))
            .or_else(|| candidates.first())
    }

    /// Turn an API entry into a sheet, preferring synced lines.
    fn sheet_from(entry: &LrcLibEntry) -> Option<LyricSheet> {
        if let Some(synced) = entry.synced_lyrics.as_deref() {
            let lines = Self::parse_lrc(synced);
            if !lines.is_empty() {
                return Some(LyricSheet {
                    provider: "lrclib".to_string(),
                    synced: true,
                    lines,
                });
            }
        }

        let plain = entry.plain_lyrics.as_deref()?.trim();
        if plain.is_empty() {
            return None;
        }
        Some(LyricSheet::plain("lrclib", plain.to_string()))
    }

    async fn get_by_signature(&self, track: &Track, title: &str, artist: &str) -> Option<LyricSheet> {
        let album = track.album.as_deref()?;
        let url = format!(
            "{API_BASE}/get?track_name={}&artist_name={}&album_name={}&duration={}",
            urlencoding::encode(title),
            urlencoding::encode(artist),
            urlencoding::encode(album),
            track.duration_ms / 1000,
        );

        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let entry: LrcLibEntry = response.json().await.ok()?;
        Self::sheet_from(&entry)
    }

    async fn search(&self, track: &Track, title: &str, artist: &str) -> Option<LyricSheet> {
        let query = format!("{title} {artist}");
        let url = format!("{API_BASE}/search?q={}", urlencoding::encode(&query));

        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let candidates: Vec<LrcLibEntry> = response.json().await.ok()?;
        let best = Self::select(&candidates, track.duration_ms)?;
        Self::sheet_from(best)
    }
}

impl Default for LrcLibProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LyricsProvider for LrcLibProvider {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn load(&self, track: &Track) -> Option<LyricSheet> {
        let title = Self::clean(&track.title, true);
        let artist = Self::clean(&track.author, false);

        if let Some(sheet) = self.get_by_signature(track, &title, &artist).await {
            return Some(sheet);
        }
        self.search(track, &title, &artist).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lrc_with_multiple_tags_per_line() {
        let lines = LrcLibProvider::parse_lrc("[00:05.00][00:45.00]repeated hook\n[00:10.50]verse");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].timestamp_ms, 5_000);
        assert_eq!(lines[1].timestamp_ms, 10_500);
        assert_eq!(lines[2].timestamp_ms, 45_000);
        assert_eq!(lines[0].text, "repeated hook");
    }

    #[test]
    fn discards_malformed_timestamp_tags() {
        let lines = LrcLibProvider::parse_lrc(
            "[banana]not timed\n[00:xx.00]still broken\n[01:02.03]the only good line",
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].timestamp_ms, 62_030);
        assert_eq!(lines[0].text, "the only good line");
    }

    #[test]
    fn sorts_out_of_order_tags() {
        let lines = LrcLibProvider::parse_lrc("[00:30.00]later\n[00:10.00]earlier");
        assert_eq!(lines[0].text, "earlier");
        assert_eq!(lines[1].text, "later");
    }

    fn entry(name: &str, duration: f64, instrumental: bool) -> LrcLibEntry {
        LrcLibEntry {
            track_name: name.to_string(),
            artist_name: "a".to_string(),
            duration,
            instrumental,
            synced_lyrics: None,
            plain_lyrics: Some("words".to_string()),
        }
    }

    #[test]
    fn selects_candidate_within_duration_tolerance() {
        let candidates = vec![entry("wrong", 240.0, false), entry("right", 181.0, false)];
        let best = LrcLibProvider::select(&candidates, 180_000).unwrap();
        assert_eq!(best.track_name, "right");
    }

    #[test]
    fn falls_back_to_first_candidate_when_nothing_matches() {
        let candidates = vec![entry("first", 240.0, false), entry("second", 300.0, false)];
        let best = LrcLibProvider::select(&candidates, 180_000).unwrap();
        assert_eq!(best.track_name, "first");
    }

    #[test]
    fn skips_instrumentals_when_possible() {
        let candidates = vec![entry("karaoke", 180.0, true), entry("sung", 180.0, false)];
        let best = LrcLibProvider::select(&candidates, 180_000).unwrap();
        assert_eq!(best.track_name, "sung");
    }

    #[test]
    fn cleans_upload_noise_from_titles() {
        assert_eq!(
            LrcLibProvider::clean("Song Name (Official Video) [4K]", true),
            "Song Name"
        );
        assert_eq!(
            LrcLibProvider::clean("Song (feat. Someone)", true),
            "Song"
        );
        assert_eq!(
            LrcLibProvider::clean("Song [feat. Someone]", true),
            "Song"
        );
        assert_eq!(
            LrcLibProvider::clean("Song (feat. Someone)", false),
            "Song (feat. Someone)"
        );
        assert_eq!(LrcLibProvider::clean("Artist - Topic", false), "Artist");
    }
}
