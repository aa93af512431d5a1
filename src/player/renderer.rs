use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::room::Room;
use crate::audio::{AudioBackend, PlaybackStatus};
use crate::chat::{ChatGateway, OutboundMessage, StatusCard};
use crate::common::format_duration;
use crate::common::types::Shared;
use crate::lyrics::{LyricCursor, LyricSheet};
use crate::track::Track;

/// Everything one renderer task needs, bound to a single track's lifetime.
pub(crate) struct RenderCtx {
    pub chat: Arc<dyn ChatGateway>,
    pub audio: Arc<dyn AudioBackend>,
    pub room: Arc<Room>,
    pub track: Track,
    /// Filled in by the lyric fetch task whenever it lands; rendered from
    /// the next tick on.
    pub lyrics: Shared<Option<LyricSheet>>,
    pub generation: u64,
    pub interval: Duration,
}

/// Previous / current / next synced lines around the cursor.
pub(crate) struct LyricView {
    previous: Option<String>,
    current: Option<String>,
    next: Option<String>,
}

impl LyricView {
    fn at(sheet: &LyricSheet, index: Option<usize>) -> Self {
        match index {
            None => Self {
                previous: None,
                current: None,
                next: sheet.lines.first().map(|l| l.text.clone()),
            },
            Some(i) => Self {
                previous: i
                    .checked_sub(1)
                    .and_then(|p| sheet.lines.get(p))
                    .map(|l| l.text.clone()),
                current: sheet.lines.get(i).map(|l| l.text.clone()),
                next: sheet.lines.get(i + 1).map(|l| l.text.clone()),
            },
        }
    }
}

/// Build the status card for one render tick.
pub(crate) fn now_playing_card(
    track: &Track,
    elapsed: Duration,
    paused: bool,
    lyric: Option<&LyricView>,
) -> StatusCard {
    let elapsed_ms = elapsed.as_millis() as u64;
    let progress = if track.duration_ms == 0 {
        // Unknown length: no total, no percentage math.
        format!("`{} / --:--`", format_duration(elapsed_ms))
    } else {
        format!(
            "`{} / {}`",
            format_duration(elapsed_ms),
            format_duration(track.duration_ms)
        )
    };

    let mut body = format!("**{}** — {}", track.title, track.author);
    if paused {
        body.push_str("\n*paused*");
    }
    if let Some(view) = lyric {
        body.push('\n');
        if let Some(previous) = &view.previous {
            body.push('\n');
            body.push_str(previous);
        }
        if let Some(current) = &view.current {
            body.push_str("\n> **");
            body.push_str(current);
            body.push_str("**");
        }
        if let Some(next) = &view.next {
            body.push('\n');
            body.push_str(next);
        }
    }

    StatusCard {
        title: "Now Playing".to_string(),
        body,
        thumbnail: track.artwork_url.clone(),
        progress: Some(progress),
    }
}

/// Live now-playing loop for one track.
///
/// Posts the initial card, then re-renders on a fixed interval while the
/// backend reports playing-or-paused and this renderer's generation is still
/// current. A failed edit skips that tick; it never aborts the loop.
pub(crate) async fn render_loop(ctx: RenderCtx) {
    let RenderCtx {
        chat,
        audio,
        room,
        track,
        lyrics,
        generation,
        interval,
    } = ctx;

    let initial = now_playing_card(&track, Duration::ZERO, false, None);
    let message = match chat.post(&room.id, &OutboundMessage::Card(initial)).await {
        Ok(id) => id,
        Err(err) => {
            warn!(room = %room.id, %err, "could not post now-playing message");
            return;
        }
    };

    let mut cursor = LyricCursor::new();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if room.generation() != generation {
            break; // a newer track took over this room
        }
        if audio.status(&room.id) == PlaybackStatus::Stopped {
            break;
        }

        let snapshot = {
            let state = room.state.lock().await;
            state
                .now_playing
                .as_ref()
                .filter(|now| now.generation == generation)
                .map(|now| (now.elapsed(), now.is_paused()))
        };
        let Some((elapsed, paused)) = snapshot else {
            break;
        };

        // try_lock: if the fetch task is mid-write we just render without
        // lyrics this tick.
        let lyric_view = match lyrics.try_lock() {
            Ok(guard) => guard.as_ref().filter(|sheet| sheet.synced).map(|sheet| {
                let index = cursor.advance(&sheet.lines, elapsed.as_millis() as u64);
                LyricView::at(sheet, index)
            }),
            Err(_) => None,
        };

        let card = now_playing_card(&track, elapsed, paused, lyric_view.as_ref());
        if let Err(err) = chat
            .edit(&room.id, message, &OutboundMessage::Card(card))
            .await
        {
            debug!(room = %room.id, %err, "status edit failed, skipping tick");
        }
    }

    debug!(room = %room.id, title = %track.title, "renderer finished");
}
