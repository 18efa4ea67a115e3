use log::debug;
use poise::serenity_prelude::ChannelId;

use crate::discord::MessageLookup;
use crate::types::{BotIdentity, InboundMessage};

use super::trigger::{TriggerMode, command_topic, strip_mention};

/// Outcome of running a message through the intake filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Not for us.
    Ignore,
    /// Triggered without a topic; answer with the usage hint.
    Usage,
    /// Triggered with this topic.
    Query(String),
}

impl Intake {
    fn from_topic(topic: &str) -> Self {
        if topic.is_empty() {
            Intake::Usage
        } else {
            Intake::Query(topic.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntakeFilter {
    identity: BotIdentity,
    scope: ChannelId,
    mode: TriggerMode,
}

impl IntakeFilter {
    #[must_use]
    pub fn new(identity: BotIdentity, scope: ChannelId, mode: TriggerMode) -> Self {
        Self {
            identity,
            scope,
            mode,
        }
    }

    #[must_use]
    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    #[must_use]
    pub fn scope(&self) -> ChannelId {
        self.scope
    }

    /// Decide whether `message` should be answered and extract its topic.
    ///
    /// `lookup` is only consulted in mention mode, for messages that reply to
    /// another message without mentioning the bot.
    pub async fn evaluate<L>(&self, message: &InboundMessage, lookup: &L) -> Intake
    where
        L: MessageLookup + ?Sized,
    {
        if message.author_id == self.identity.user_id {
            return Intake::Ignore;
        }
        if message.channel_id != self.scope {
            return Intake::Ignore;
        }

        match self.mode {
            TriggerMode::Command => {
                command_topic(&message.content).map_or(Intake::Ignore, Intake::from_topic)
            }
            TriggerMode::Mention => self.evaluate_mention(message, lookup).await,
        }
    }

    async fn evaluate_mention<L>(&self, message: &InboundMessage, lookup: &L) -> Intake
    where
        L: MessageLookup + ?Sized,
    {
        if let Some(topic) = strip_mention(&message.content, &self.identity) {
            return Intake::from_topic(&topic);
        }
        if message.mentions.contains(&self.identity.user_id) {
            return Intake::from_topic(message.content.trim());
        }

        let Some(reference) = message.reference else {
            return Intake::Ignore;
        };

        match lookup
            .author_of(reference.channel_id, reference.message_id)
            .await
        {
            Ok(author) if author == self.identity.user_id => {
                Intake::from_topic(message.content.trim())
            }
            Ok(_) => Intake::Ignore,
            Err(e) => {
                debug!(
                    "Could not resolve referenced message {}: {e}",
                    reference.message_id
                );
                Intake::Ignore
            }
        }
    }
}
