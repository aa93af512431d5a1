use std::collections::VecDeque;

use crate::track::TrackRequest;

/// Per-room FIFO of pending track requests.
///
/// A pure data structure: no locking, no capacity limit (unbounded growth is
/// an accepted risk). The currently playing track is never in here; it lives
/// in the room's now-playing slot. Secrecy of entries is enforced by the
/// display layer, not by the queue itself.
#[derive(Debug, Default)]
pub struct TrackQueue {
    entries: VecDeque<TrackRequest>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: TrackRequest) {
        self.entries.push_back(request);
    }

    pub fn pop_front(&mut self) -> Option<TrackRequest> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pending entries in play order.
    pub fn entries(&self) -> impl Iterator<Item = &TrackRequest> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::UserId;

    fn request(query: &str) -> TrackRequest {
        TrackRequest {
            query: query.to_string(),
            requester: UserId(1),
            secret: false,
        }
    }

    #[test]
    fn preserves_insertion_order() {
        let mut queue = TrackQueue::new();
        queue.push(request("a"));
        queue.push(request("b"));
        queue.push(request("c"));

        let order: Vec<_> = queue.entries().map(|e| e.query.clone()).collect();
        assert_eq!(order, ["a", "b", "c"]);

        assert_eq!(queue.pop_front().map(|e| e.query), Some("a".to_string()));
        assert_eq!(queue.pop_front().map(|e| e.query), Some("b".to_string()));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let mut queue = TrackQueue::new();
        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = TrackQueue::new();
        queue.push(request("a"));
        queue.push(request("b"));
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
    }
}
