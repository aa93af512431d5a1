use std::time::{Duration, Instant};

use crate::track::Track;

/// The driver's state machine.
///
/// `Starting` covers resolution and connection; `Advancing` is the
/// transitional hop between a completion signal and the next `Starting` or
/// `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Starting,
    Playing,
    Paused,
    Advancing,
}

/// The track currently streaming in a room, with pause-aware elapsed
/// accounting.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub track: Track,
    /// Renderer supersession marker: a renderer whose generation no longer
    /// matches the room's counter must terminate.
    pub generation: u64,
    started_at: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl NowPlaying {
    pub fn new(track: Track, generation: u64) -> Self {
        Self {
            track,
            generation,
            started_at: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Idempotent: pausing while paused changes nothing.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    /// Idempotent: resuming while playing changes nothing.
    pub fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += at.elapsed();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Playback time so far, excluding time spent paused. Frozen while
    /// paused.
    pub fn elapsed(&self) -> Duration {
        let gross = match self.paused_at {
            Some(at) => at.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        };
        gross.saturating_sub(self.paused_total)
    }

    #[cfg(test)]
    fn backdate(&mut self, by: Duration) {
        self.started_at -= by;
    }
}
