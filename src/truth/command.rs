//! `/truth` slash command.

use async_trait::async_trait;
use log::info;
use poise::CreateReply;
use poise::serenity_prelude::ChannelId;

use crate::bot::Data;
use crate::discord::ChatSink;
use crate::error::{BotError, Result};
use crate::openai::Completion;
use crate::types::OutboundChunk;

use super::answer::deliver_answer;

/// Context type for truth commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

const SLASH_USAGE: &str = "Usage: `/truth <topic>`";

/// What to do with a `/truth` invocation before any completion is requested.
#[derive(Debug, PartialEq, Eq)]
enum SlashTopic<'t> {
    /// Invoked outside the scope channel; point the user there.
    Elsewhere(ChannelId),
    Missing,
    Topic(&'t str),
}

impl SlashTopic<'_> {
    fn evaluate(channel_id: ChannelId, scope: ChannelId, topic: &str) -> SlashTopic<'_> {
        if channel_id != scope {
            return SlashTopic::Elsewhere(scope);
        }
        match topic.trim() {
            "" => SlashTopic::Missing,
            topic => SlashTopic::Topic(topic),
        }
    }

    /// Ephemeral notice for invocations that never reach the completion API.
    fn notice(&self) -> Option<String> {
        match self {
            SlashTopic::Elsewhere(scope) => Some(format!("Ask me in <#{scope}>.")),
            SlashTopic::Missing => Some(SLASH_USAGE.to_string()),
            SlashTopic::Topic(_) => None,
        }
    }
}

/// Follow-up messages on a deferred interaction.
struct InteractionSink<'a> {
    ctx: Context<'a>,
}

#[async_trait]
impl<'a> ChatSink for InteractionSink<'a> {
    async fn send(&self, _channel_id: ChannelId, chunk: OutboundChunk) -> Result<()> {
        self.ctx.say(chunk.content).await?;
        Ok(())
    }

    /// A deferred interaction already shows its own "thinking" state.
    async fn broadcast_typing(&self, _channel_id: ChannelId) -> Result<()> {
        Ok(())
    }
}

/// Get the brutal truth about a topic.
#[poise::command(slash_command)]
pub async fn truth(
    ctx: Context<'_>,
    #[description = "Topic to expose"] topic: String,
) -> Result<()> {
    let channel_id = ctx.channel_id();
    let checked = SlashTopic::evaluate(channel_id, ctx.data().filter().scope(), &topic);

    let topic = match checked {
        SlashTopic::Topic(topic) => topic,
        other => {
            if let Some(notice) = other.notice() {
                ctx.send(CreateReply::default().content(notice).ephemeral(true))
                    .await?;
            }
            return Ok(());
        }
    };

    info!("Received /truth from {}: {topic}", ctx.author().tag());
    ctx.defer().await?;

    let answer = ctx.data().completion().complete(topic).await;
    let delivered = deliver_answer(&InteractionSink { ctx }, channel_id, answer, None).await?;
    info!(
        "Answered /truth from {} with {delivered} message(s)",
        ctx.author().tag()
    );

    Ok(())
}

/// Get available truth commands.
#[must_use]
pub fn truth_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![truth()]
}
