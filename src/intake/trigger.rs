//! Trigger parsing for the two supported invocation styles.

use strum::{Display, EnumString};

use crate::types::BotIdentity;

/// Literal prefix of the text command, including its separating space.
pub const COMMAND_PREFIX: &str = "!truth ";

/// How users invoke the bot in the scope channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TriggerMode {
    /// `!truth <topic>`
    #[default]
    Command,
    /// `@bot <topic>` or a reply to one of the bot's messages
    Mention,
}

impl TriggerMode {
    /// Hint sent when the bot was triggered without a topic.
    #[must_use]
    pub fn usage_hint(self) -> &'static str {
        match self {
            TriggerMode::Command => "Usage: `!truth <topic>`",
            TriggerMode::Mention => "Mention me with a topic, e.g. @bot <topic>",
        }
    }

    /// Whether the first chunk of an answer is threaded onto the trigger.
    #[must_use]
    pub fn threads_replies(self) -> bool {
        matches!(self, TriggerMode::Mention)
    }
}

/// Returns the trimmed topic when `content` starts with the exact command prefix.
pub(super) fn command_topic(content: &str) -> Option<&str> {
    content.strip_prefix(COMMAND_PREFIX).map(str::trim)
}

/// Removes every mention of the bot, or `None` when there is none.
pub(super) fn strip_mention(content: &str, identity: &BotIdentity) -> Option<String> {
    let tokens = identity.mention_tokens();
    if !tokens.iter().any(|token| content.contains(token.as_str())) {
        return None;
    }

    let stripped = tokens
        .iter()
        .fold(content.to_string(), |text, token| text.replace(token.as_str(), ""));
    Some(stripped.trim().to_string())
}
