use thiserror::Error;

/// Why a query could not be turned into a playable track.
///
/// `Provider` marks transient upstream failures so callers can tell them
/// apart from a genuine "this song does not exist".
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("no match found for `{query}`")]
    NotFound { query: String },
    /// A catalog match existed but no provider could produce a stream URL.
    #[error("`{title}` matched but no playable stream was found")]
    StreamUnavailable { title: String },
    #[error("{provider}: {message}")]
    Provider { provider: String, message: String },
}

impl ResolveError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }
}

/// Failure reported by the chat gateway implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ChatError(pub String);

/// Failure reported by the audio backend implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AudioError(pub String);

/// Errors surfaced by the engine's command methods.
///
/// Resolution and audio-start failures never appear here: the driver converts
/// them into "skip and advance" and reports them as chat notices instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("chat gateway: {0}")]
    Chat(#[from] ChatError),
    #[error("audio backend: {0}")]
    Audio(#[from] AudioError),
}
