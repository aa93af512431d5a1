use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::state::{NowPlaying, PlaybackPhase};
use crate::common::types::{ChannelId, RoomId};
use crate::queue::TrackQueue;
use crate::track::Track;

/// Everything the engine mutates for one room.
///
/// All mutation happens under the room's single mutex so command handlers,
/// the driver and the completion handler never race (single-writer
/// discipline).
#[derive(Debug)]
pub struct RoomState {
    pub phase: PlaybackPhase,
    pub queue: TrackQueue,
    pub now_playing: Option<NowPlaying>,
    /// Whether a completion signal should pull the next queue entry.
    pub auto_advance: bool,
    /// Recently finished tracks, most-recent-last, for display only.
    pub history: VecDeque<Track>,
    pub channel: Option<ChannelId>,
}

impl RoomState {
    fn new() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            queue: TrackQueue::new(),
            now_playing: None,
            auto_advance: true,
            history: VecDeque::new(),
            channel: None,
        }
    }

    pub fn push_history(&mut self, track: Track, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if self.history.len() == capacity {
            self.history.pop_front();
        }
        self.history.push_back(track);
    }
}

pub struct Room {
    pub id: RoomId,
    pub state: Mutex<RoomState>,
    generation: AtomicU64,
}

impl Room {
    fn new(id: RoomId) -> Self {
        Self {
            id,
            state: Mutex::new(RoomState::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Bump the generation, retiring any renderer bound to the previous one.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Mapping from room id to its playback state.
///
/// Rooms are created lazily on first use and removed on explicit stop; the
/// registry replaces the source pattern of ad-hoc global dictionaries.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Arc<Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.get(id).map(|room| Arc::clone(&room))
    }

    pub fn get_or_create(&self, id: &RoomId) -> Arc<Room> {
        Arc::clone(
            &self
                .rooms
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Room::new(id.clone()))),
        )
    }

    pub fn remove(&self, id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.remove(id).map(|(_, room)| room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str) -> Track {
        Track {
            stream_url: format!("https://cdn.example/{title}.opus"),
            title: title.to_string(),
            author: "a".to_string(),
            album: None,
            artwork_url: None,
            duration_ms: 1_000,
            source_name: "test".to_string(),
        }
    }

    #[test]
    fn rooms_are_created_lazily_and_reused() {
        let registry = RoomRegistry::new();
        assert!(registry.is_empty());

        let id = RoomId::from("general");
        let a = registry.get_or_create(&id);
        let b = registry.get_or_create(&id);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);

        registry.remove(&id);
        assert!(registry.get(&id).is_none());
    }

    #[test]
    fn history_is_bounded_most_recent_last() {
        let mut state = RoomState::new();
        for i in 0..5 {
            state.push_history(track(&format!("t{i}")), 3);
        }
        let titles: Vec<_> = state.history.iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, ["t2", "t3", "t4"]);
    }

    #[test]
    fn generation_is_monotonic() {
        let room = Room::new(RoomId::from("r"));
        assert_eq!(room.generation(), 0);
        assert_eq!(room.next_generation(), 1);
        assert_eq!(room.next_generation(), 2);
        assert_eq!(room.generation(), 2);
    }
}
