use async_trait::async_trait;

use crate::common::types::{ChannelId, MessageId, RoomId, UserId};
use crate::error::ChatError;

/// Outbound content pushed into a chat room.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// A transient one-line reply to a command.
    Notice(String),
    /// A rich status card, edited in place while a track plays.
    Card(StatusCard),
}

/// A now-playing style card. How it maps to the chat platform's rich message
/// format (embed, attachment, block) is up to the gateway implementation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCard {
    pub title: String,
    pub body: String,
    pub thumbnail: Option<String>,
    /// Progress line, e.g. `` `01:23 / 03:00` ``.
    pub progress: Option<String>,
}

/// The chat platform, as seen by the engine.
///
/// Implementations wrap whatever gateway SDK the front-end uses. The engine
/// only ever posts and edits messages and asks which voice channel a user
/// occupies; command delivery is the front-end's job.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn post(
        &self,
        room: &RoomId,
        message: &OutboundMessage,
    ) -> Result<MessageId, ChatError>;

    async fn edit(
        &self,
        room: &RoomId,
        message: MessageId,
        content: &OutboundMessage,
    ) -> Result<(), ChatError>;

    /// The voice channel `user` currently occupies in `room`, if any.
    fn voice_channel_of(&self, room: &RoomId, user: UserId) -> Option<ChannelId>;
}
