//! Discord capabilities used by the responder, implemented for serenity's HTTP client.

use async_trait::async_trait;
use poise::serenity_prelude::{
    ChannelId, CreateAllowedMentions, CreateMessage, Http, MessageId, UserId,
};

use crate::error::Result;
use crate::types::OutboundChunk;

/// Resolves who wrote an earlier message.
#[async_trait]
pub trait MessageLookup: Send + Sync {
    async fn author_of(&self, channel_id: ChannelId, message_id: MessageId) -> Result<UserId>;
}

/// Outbound side of a channel.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, channel_id: ChannelId, chunk: OutboundChunk) -> Result<()>;

    async fn broadcast_typing(&self, channel_id: ChannelId) -> Result<()>;
}

#[async_trait]
impl MessageLookup for Http {
    async fn author_of(&self, channel_id: ChannelId, message_id: MessageId) -> Result<UserId> {
        let message = self.get_message(channel_id, message_id).await?;
        Ok(message.author.id)
    }
}

#[async_trait]
impl ChatSink for Http {
    async fn send(&self, channel_id: ChannelId, chunk: OutboundChunk) -> Result<()> {
        let mut message = CreateMessage::new().content(chunk.content);

        if let Some(reply_to) = chunk.reply_to {
            message = message.reference_message((reply_to.channel_id, reply_to.message_id));
        }
        if chunk.suppress_mention {
            message = message.allowed_mentions(CreateAllowedMentions::new().replied_user(false));
        }

        channel_id.send_message(self, message).await?;
        Ok(())
    }

    async fn broadcast_typing(&self, channel_id: ChannelId) -> Result<()> {
        Http::broadcast_typing(self, channel_id).await?;
        Ok(())
    }
}
