use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::renderer::{self, RenderCtx};
use super::room::{Room, RoomRegistry};
use super::state::{NowPlaying, PlaybackPhase};
use crate::audio::{AudioBackend, AudioEvent};
use crate::chat::{ChatGateway, OutboundMessage};
use crate::common::types::{RoomId, Shared, UserId};
use crate::config::{Config, PlayerConfig};
use crate::error::EngineError;
use crate::lyrics::{LyricSheet, LyricsManager};
use crate::responses;
use crate::sources::SourceManager;
use crate::track::TrackRequest;

/// The playback driver.
///
/// One engine serves every room; rooms are fully independent and each one's
/// state is serialized behind its own mutex. Commands mutate room state and
/// reply with transient chat notices; playback advances are driven entirely
/// by the audio backend's completion events, consumed by a single event
/// loop (see [`spawn_event_loop`](Self::spawn_event_loop)).
pub struct Engine {
    rooms: RoomRegistry,
    sources: Arc<SourceManager>,
    lyrics: Arc<LyricsManager>,
    chat: Arc<dyn ChatGateway>,
    audio: Arc<dyn AudioBackend>,
    settings: PlayerConfig,
}

impl Engine {
    pub fn new(
        config: &Config,
        chat: Arc<dyn ChatGateway>,
        audio: Arc<dyn AudioBackend>,
    ) -> Arc<Self> {
        Self::with_components(
            config.player.clone(),
            Arc::new(SourceManager::new(config)),
            Arc::new(LyricsManager::new(config)),
            chat,
            audio,
        )
    }

    pub fn with_components(
        settings: PlayerConfig,
        sources: Arc<SourceManager>,
        lyrics: Arc<LyricsManager>,
        chat: Arc<dyn ChatGateway>,
        audio: Arc<dyn AudioBackend>,
    ) -> Arc<Self> {
        Arc::new(Self {
            rooms: RoomRegistry::new(),
            sources,
            lyrics,
            chat,
            audio,
            settings,
        })
    }

    /// Spawn the loop that consumes the backend's completion events. Must be
    /// running for playback to advance past the first track.
    pub fn spawn_event_loop(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        let events = self.audio.events();
        tokio::spawn(async move {
            while let Ok(event) = events.recv_async().await {
                engine.handle_track_end(event).await;
            }
            debug!("audio event channel closed");
        })
    }

    /// Enqueue a query. If nothing is playing in the room, playback starts
    /// immediately; otherwise the entry waits its turn.
    pub async fn play(
        self: &Arc<Self>,
        room_id: &RoomId,
        user: UserId,
        query: &str,
        secret: bool,
    ) -> Result<(), EngineError> {
        let Some(channel) = self.chat.voice_channel_of(room_id, user) else {
            return self.notice(room_id, responses::not_in_voice()).await;
        };

        let room = self.rooms.get_or_create(room_id);
        let request = TrackRequest {
            query: query.to_string(),
            requester: user,
            secret,
        };

        let start_now = {
            let mut state = room.state.lock().await;
            state.channel = Some(channel);
            state.queue.push(request);
            if state.phase == PlaybackPhase::Idle && state.now_playing.is_none() {
                state.phase = PlaybackPhase::Starting;
                true
            } else {
                false
            }
        };

        if start_now {
            let engine = Arc::clone(self);
            tokio::spawn(async move { engine.advance(room).await });
        } else {
            let label = if secret {
                "a secret tune".to_string()
            } else {
                format!("**{query}**")
            };
            self.notice(room_id, responses::queued(&label)).await?;
        }
        Ok(())
    }

    pub async fn pause(&self, room_id: &RoomId) -> Result<(), EngineError> {
        let Some(room) = self.rooms.get(room_id) else {
            return Ok(());
        };
        let mut state = room.state.lock().await;
        let Some(now) = state.now_playing.as_mut() else {
            return Ok(());
        };
        if now.is_paused() {
            return Ok(()); // already paused, nothing to do
        }
        self.audio.pause(room_id).await?;
        now.pause();
        state.phase = PlaybackPhase::Paused;
        drop(state);
        self.notice(room_id, responses::paused()).await
    }

    pub async fn resume(&self, room_id: &RoomId) -> Result<(), EngineError> {
        let Some(room) = self.rooms.get(room_id) else {
            return Ok(());
        };
        let mut state = room.state.lock().await;
        let Some(now) = state.now_playing.as_mut() else {
            return Ok(());
        };
        if !now.is_paused() {
            return Ok(()); // already playing, nothing to do
        }
        self.audio.resume(room_id).await?;
        now.resume();
        state.phase = PlaybackPhase::Playing;
        drop(state);
        self.notice(room_id, responses::resumed()).await
    }

    /// Halt the current track. The advance to the next entry happens when
    /// the backend's completion event comes back, preserving the "track N+1
    /// starts only after N's completion signal" ordering.
    pub async fn skip(&self, room_id: &RoomId) -> Result<(), EngineError> {
        let Some(room) = self.rooms.get(room_id) else {
            return Ok(());
        };
        let playing = room.state.lock().await.now_playing.is_some();
        if !playing {
            return self.notice(room_id, "Nothing is playing.".to_string()).await;
        }
        self.audio.stop(room_id).await?;
        self.notice(room_id, responses::skipped()).await
    }

    pub async fn clear(&self, room_id: &RoomId) -> Result<(), EngineError> {
        if let Some(room) = self.rooms.get(room_id) {
            room.state.lock().await.queue.clear();
        }
        self.notice(room_id, responses::cleared()).await
    }

    /// Toggle whether a completion signal pulls the next queue entry. With
    /// auto-advance off the room parks in `Idle` after the current track and
    /// keeps its pending queue.
    pub async fn set_auto_advance(
        &self,
        room_id: &RoomId,
        enabled: bool,
    ) -> Result<(), EngineError> {
        let room = self.rooms.get_or_create(room_id);
        room.state.lock().await.auto_advance = enabled;
        self.notice(room_id, responses::auto_advance(enabled)).await
    }

    /// Tear the room down: clear everything, halt audio, leave the voice
    /// channel and drop the room from the registry.
    pub async fn stop(&self, room_id: &RoomId) -> Result<(), EngineError> {
        let Some(room) = self.rooms.remove(room_id) else {
            return Ok(());
        };
        {
            let mut state = room.state.lock().await;
            state.queue.clear();
            state.now_playing = None;
            state.phase = PlaybackPhase::Idle;
        }
        // Retire any live renderer before the audio halt races it.
        room.next_generation();
        if let Err(err) = self.audio.stop(room_id).await {
            debug!(room = %room_id, %err, "stop on teardown failed");
        }
        if let Err(err) = self.audio.disconnect(room_id).await {
            debug!(room = %room_id, %err, "disconnect on teardown failed");
        }
        info!(room = %room_id, "room stopped and removed");
        self.notice(room_id, responses::stopped()).await
    }

    /// Post the pending queue as seen by `viewer`: secret entries requested
    /// by someone else are omitted outright.
    pub async fn queue_view(&self, room_id: &RoomId, viewer: UserId) -> Result<(), EngineError> {
        let Some(room) = self.rooms.get(room_id) else {
            return self.notice(room_id, "The queue is empty.".to_string()).await;
        };

        let text = {
            let state = room.state.lock().await;
            let mut lines = Vec::new();
            if let Some(now) = &state.now_playing {
                lines.push(format!(
                    "Now playing: **{}** — {}",
                    now.track.title, now.track.author
                ));
            }
            let visible: Vec<&TrackRequest> = state
                .queue
                .entries()
                .filter(|entry| !entry.secret || entry.requester == viewer)
                .collect();
            if visible.is_empty() {
                lines.push("No pending tracks.".to_string());
            } else {
                for (position, entry) in visible.iter().enumerate() {
                    lines.push(format!("{}. {}", position + 1, entry.query));
                }
            }
            lines.join("\n")
        };

        self.notice(room_id, text).await
    }

    /// Post a one-off snapshot of the current track and progress.
    pub async fn status(&self, room_id: &RoomId) -> Result<(), EngineError> {
        let Some(room) = self.rooms.get(room_id) else {
            return self.notice(room_id, "Nothing is playing.".to_string()).await;
        };

        let card = {
            let state = room.state.lock().await;
            state
                .now_playing
                .as_ref()
                .map(|now| renderer::now_playing_card(&now.track, now.elapsed(), now.is_paused(), None))
        };

        match card {
            Some(card) => {
                self.chat.post(room_id, &OutboundMessage::Card(card)).await?;
                Ok(())
            }
            None => self.notice(room_id, "Nothing is playing.".to_string()).await,
        }
    }

    /// Pull queue entries until one starts playing or the queue drains.
    ///
    /// Unresolvable entries are reported and discarded; after
    /// `max_consecutive_failures` of them in a row the rest of the queue is
    /// abandoned instead of looping forever.
    async fn advance(self: Arc<Self>, room: Arc<Room>) {
        let mut failures: u32 = 0;

        loop {
            let popped = {
                let mut state = room.state.lock().await;
                match state.queue.pop_front() {
                    Some(request) => {
                        state.phase = PlaybackPhase::Starting;
                        Some((request, state.channel))
                    }
                    None => {
                        state.phase = PlaybackPhase::Idle;
                        state.now_playing = None;
                        None
                    }
                }
            };
            let Some((request, channel)) = popped else {
                if let Err(err) = self.audio.disconnect(&room.id).await {
                    debug!(room = %room.id, %err, "disconnect after drain failed");
                }
                info!(room = %room.id, "queue drained, leaving voice");
                return;
            };

            let label = if request.secret {
                "that one".to_string()
            } else {
                format!("**{}**", request.query)
            };

            // `stop` removes the room and bumps its generation; either
            // observed across the awaits below means this start is stale.
            let startup_generation = room.generation();

            let resolved = self.sources.resolve(&request.query).await;
            if room.generation() != startup_generation || !self.room_is_live(&room) {
                debug!(room = %room.id, "room torn down while resolving, abandoning entry");
                return;
            }
            let track = match resolved {
                Ok(track) => track,
                Err(err) => {
                    warn!(room = %room.id, query = %request.query, %err, "could not resolve entry");
                    if self.entry_failed(&room, &mut failures, &label).await {
                        return;
                    }
                    continue;
                }
            };

            if let Some(channel) = channel {
                if let Err(err) = self.audio.connect(&room.id, channel).await {
                    warn!(room = %room.id, %err, "voice connect failed");
                    if self.entry_failed(&room, &mut failures, &label).await {
                        return;
                    }
                    continue;
                }
                if room.generation() != startup_generation || !self.room_is_live(&room) {
                    debug!(room = %room.id, "room torn down while connecting, abandoning entry");
                    let _ = self.audio.disconnect(&room.id).await;
                    return;
                }
            }

            if let Err(err) = self.audio.play(&room.id, &track.stream_url).await {
                warn!(room = %room.id, title = %track.title, %err, "audio backend refused to start");
                if self.entry_failed(&room, &mut failures, &label).await {
                    return;
                }
                continue;
            }

            if !self.room_is_live(&room) {
                // A teardown slipped in after its own audio halt; the stream
                // started just above is the one that must be halted now.
                debug!(room = %room.id, "stopped while starting, halting stream");
                let _ = self.audio.stop(&room.id).await;
                let _ = self.audio.disconnect(&room.id).await;
                return;
            }

            let generation = room.next_generation();
            {
                let mut state = room.state.lock().await;
                state.now_playing = Some(NowPlaying::new(track.clone(), generation));
                state.phase = PlaybackPhase::Playing;
            }

            info!(
                room = %room.id,
                title = %track.title,
                source = %track.source_name,
                "playback started"
            );
            let _ = self.notice(&room.id, responses::play_started(&track.title)).await;

            // Lyrics land asynchronously; the renderer picks the sheet up on
            // whichever tick it arrives.
            let sheet_slot: Shared<Option<LyricSheet>> = Arc::new(Mutex::new(None));
            {
                let lyrics = Arc::clone(&self.lyrics);
                let slot = Arc::clone(&sheet_slot);
                let track = track.clone();
                tokio::spawn(async move {
                    let sheet = lyrics.load(&track).await;
                    if sheet.is_none() {
                        debug!(title = %track.title, "no lyrics found");
                    }
                    *slot.lock().await = sheet;
                });
            }

            tokio::spawn(renderer::render_loop(RenderCtx {
                chat: Arc::clone(&self.chat),
                audio: Arc::clone(&self.audio),
                room: Arc::clone(&room),
                track,
                lyrics: sheet_slot,
                generation,
                interval: Duration::from_millis(self.settings.render_interval_ms),
            }));
            return;
        }
    }

    /// Whether `room` is still the registered instance for its id. `stop`
    /// removes the room from the registry, so a mismatch means a teardown
    /// raced this task.
    fn room_is_live(&self, room: &Arc<Room>) -> bool {
        self.rooms
            .get(&room.id)
            .is_some_and(|current| Arc::ptr_eq(&current, room))
    }

    /// Report one unplayable entry. Returns true when the consecutive
    /// failure cap was hit and the queue has been abandoned.
    async fn entry_failed(&self, room: &Room, failures: &mut u32, label: &str) -> bool {
        let _ = self.notice(&room.id, responses::resolve_failed(label)).await;
        *failures += 1;
        if *failures < self.settings.max_consecutive_failures {
            return false;
        }

        warn!(room = %room.id, failures, "abandoning queue after consecutive failures");
        let _ = self.notice(&room.id, responses::queue_exhausted()).await;
        {
            let mut state = room.state.lock().await;
            state.queue.clear();
            state.now_playing = None;
            state.phase = PlaybackPhase::Idle;
        }
        if let Err(err) = self.audio.disconnect(&room.id).await {
            debug!(room = %room.id, %err, "disconnect after abandon failed");
        }
        true
    }

    /// One track's completion signal: record history and, when auto-advance
    /// is on, pull the next entry. Rooms already torn down by `stop` are
    /// simply skipped.
    async fn handle_track_end(self: &Arc<Self>, event: AudioEvent) {
        let Some(room) = self.rooms.get(&event.room) else {
            return;
        };

        let advance = {
            let mut state = room.state.lock().await;
            let Some(now) = state.now_playing.take() else {
                return;
            };
            debug!(
                room = %room.id,
                title = %now.track.title,
                reason = ?event.reason,
                "track ended"
            );
            state.push_history(now.track, self.settings.history_capacity);
            if state.auto_advance {
                state.phase = PlaybackPhase::Advancing;
                true
            } else {
                state.phase = PlaybackPhase::Idle;
                false
            }
        };

        if advance {
            let engine = Arc::clone(self);
            tokio::spawn(async move { engine.advance(room).await });
        }
    }

    async fn notice(&self, room: &RoomId, text: String) -> Result<(), EngineError> {
        self.chat.post(room, &OutboundMessage::Notice(text)).await?;
        Ok(())
    }
}
