use serde::{Deserialize, Serialize};

use crate::common::types::UserId;

/// A fully resolved, playable track descriptor.
///
/// Immutable once produced by a source; owned by the now-playing slot or the
/// history ring, never by the pending queue (pending entries are still raw
/// [`TrackRequest`]s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Direct stream locator handed to the audio backend.
    pub stream_url: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    /// Track length in milliseconds. 0 when the source could not report one;
    /// progress percentages are skipped in that case.
    pub duration_ms: u64,
    pub source_name: String,
}

/// A pending queue entry, not yet resolved against any catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRequest {
    pub query: String,
    pub requester: UserId,
    /// Secret entries are hidden from other users' queue views. This is a
    /// presentation-layer filter, not an access-control guarantee.
    pub secret: bool,
}
