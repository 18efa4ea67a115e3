use log::error;
use poise::serenity_prelude::ChannelId;

use crate::discord::ChatSink;
use crate::dispatch::dispatch;
use crate::error::Result;
use crate::types::{MessageRef, OutboundChunk};

use super::{EMPTY_ANSWER, ERROR_PREFIX};

/// Post the outcome of a completion to `channel_id`.
///
/// A successful answer is trimmed, replaced by [`EMPTY_ANSWER`] when blank and
/// sent through [`dispatch`]. A failed one becomes exactly one error report.
/// Returns how many messages reached the channel.
pub async fn deliver_answer<S>(
    sink: &S,
    channel_id: ChannelId,
    answer: Result<String>,
    reply_to: Option<MessageRef>,
) -> Result<usize>
where
    S: ChatSink + ?Sized,
{
    match answer {
        Ok(text) => {
            let text = text.trim();
            let text = if text.is_empty() { EMPTY_ANSWER } else { text };
            Ok(dispatch(sink, channel_id, text, reply_to).await)
        }
        Err(e) => {
            error!("Error answering topic in channel {channel_id}: {e}");
            let report =
                OutboundChunk::replying(format!("{ERROR_PREFIX} {}", e.user_message()), reply_to);
            sink.send(channel_id, report).await?;
            Ok(1)
        }
    }
}
