use async_trait::async_trait;

use crate::common::types::{ChannelId, RoomId};
use crate::error::AudioError;

/// What the backend reports for a room's audio output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEndReason {
    /// The stream ran to its natural end.
    Finished,
    /// Halted by `stop` (skip or teardown).
    Stopped,
    /// The stream died mid-playback.
    LoadFailed,
}

/// Completion signal emitted by the backend when a room's stream ends.
#[derive(Debug, Clone)]
pub struct AudioEvent {
    pub room: RoomId,
    pub reason: TrackEndReason,
}

/// The voice/audio subsystem, as seen by the engine.
///
/// Implementations wrap the actual transcoding and voice transport. The one
/// hard contract: every stream that was started with [`play`](Self::play)
/// must eventually produce exactly one [`AudioEvent`] on the channel returned
/// by [`events`](Self::events) — including when it was halted by
/// [`stop`](Self::stop). The engine's advance logic is driven entirely by
/// those events, never by callbacks.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    async fn connect(&self, room: &RoomId, channel: ChannelId) -> Result<(), AudioError>;

    async fn disconnect(&self, room: &RoomId) -> Result<(), AudioError>;

    /// Begin streaming `stream_url` into the room's voice session.
    async fn play(&self, room: &RoomId, stream_url: &str) -> Result<(), AudioError>;

    async fn pause(&self, room: &RoomId) -> Result<(), AudioError>;

    async fn resume(&self, room: &RoomId) -> Result<(), AudioError>;

    /// Halt the current stream promptly. Must emit a
    /// [`TrackEndReason::Stopped`] event if anything was playing or paused.
    async fn stop(&self, room: &RoomId) -> Result<(), AudioError>;

    fn status(&self, room: &RoomId) -> PlaybackStatus;

    /// Completion events for all rooms handled by this backend.
    fn events(&self) -> flume::Receiver<AudioEvent>;
}
