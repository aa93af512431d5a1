pub mod engine;
pub mod renderer;
pub mod room;
pub mod state;

pub use engine::Engine;
pub use room::{Room, RoomRegistry, RoomState};
pub use state::{NowPlaying, PlaybackPhase};
