//! Common types used throughout the truthbot.

use poise::serenity_prelude::{ChannelId, GuildId, Message as SerenityMessage, MessageId, UserId};
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation.
///
/// Maps to OpenAI chat completion message roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt or instructions
    System,
    /// Message from the human user
    User,
    /// Message from the AI assistant
    Assistant,
}

/// The bot's own Discord identity, captured once the gateway is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: UserId,
}

impl BotIdentity {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The two textual forms Discord uses to mention a user.
    #[must_use]
    pub fn mention_tokens(&self) -> [String; 2] {
        [format!("<@{}>", self.user_id), format!("<@!{}>", self.user_id)]
    }
}

/// Points at a specific message in a specific channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// The parts of a Discord message the intake filter looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub content: String,
    pub mentions: Vec<UserId>,
    pub reference: Option<MessageRef>,
}

impl InboundMessage {
    /// Reference to this message, used to thread replies onto it.
    #[must_use]
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            channel_id: self.channel_id,
            message_id: self.id,
        }
    }
}

impl From<&SerenityMessage> for InboundMessage {
    fn from(message: &SerenityMessage) -> Self {
        let reference = message.message_reference.as_ref().and_then(|reference| {
            reference.message_id.map(|message_id| MessageRef {
                channel_id: reference.channel_id,
                message_id,
            })
        });

        Self {
            id: message.id,
            author_id: message.author.id,
            channel_id: message.channel_id,
            guild_id: message.guild_id,
            content: message.content.clone(),
            mentions: message.mentions.iter().map(|user| user.id).collect(),
            reference,
        }
    }
}

/// One bounded segment of an outbound reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundChunk {
    pub content: String,
    pub reply_to: Option<MessageRef>,
    /// Don't ping the author of the message being replied to.
    pub suppress_mention: bool,
}

impl OutboundChunk {
    #[must_use]
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            reply_to: None,
            suppress_mention: false,
        }
    }

    #[must_use]
    pub fn replying(content: impl Into<String>, reply_to: Option<MessageRef>) -> Self {
        Self {
            content: content.into(),
            suppress_mention: reply_to.is_some(),
            reply_to,
        }
    }
}
