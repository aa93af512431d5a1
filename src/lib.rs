//! Cadenza is the playback core of a chat-room music assistant.
//!
//! It turns free-text queries into playable tracks through a prioritized
//! chain of audio sources, keeps a per-room queue, drives playback through
//! an event-driven state machine and keeps a live now-playing message
//! (progress plus synced lyrics) updated in chat.
//!
//! The chat platform and the actual audio pipeline are behind the
//! [`chat::ChatGateway`] and [`audio::AudioBackend`] traits; everything in
//! between is platform-neutral.

pub mod audio;
pub mod chat;
pub mod common;
pub mod config;
pub mod error;
pub mod logging;
pub mod lyrics;
pub mod player;
pub mod queue;
pub mod responses;
pub mod sources;
pub mod track;

pub use config::Config;
pub use error::{EngineError, ResolveError};
pub use player::Engine;
pub use track::Track;
