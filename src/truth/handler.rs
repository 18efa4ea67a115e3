//! Main handler for messages posted in the scope channel.

use std::sync::Arc;

use log::info;

use crate::discord::{ChatSink, MessageLookup};
use crate::error::Result;
use crate::intake::{Intake, IntakeFilter};
use crate::openai::Completion;
use crate::types::{InboundMessage, OutboundChunk};

use super::answer::deliver_answer;
use super::typing::start_typing;

/// Run one inbound message through intake, completion and dispatch.
pub async fn handle_message<S, C>(
    sink: &Arc<S>,
    message: &InboundMessage,
    filter: &IntakeFilter,
    completion: &C,
) -> Result<()>
where
    S: ChatSink + MessageLookup + ?Sized + 'static,
    C: Completion + ?Sized,
{
    let reply_to = filter
        .mode()
        .threads_replies()
        .then(|| message.message_ref());

    let query = match filter.evaluate(message, &**sink).await {
        Intake::Ignore => return Ok(()),
        Intake::Usage => {
            let hint = OutboundChunk::replying(filter.mode().usage_hint(), reply_to);
            sink.send(message.channel_id, hint).await?;
            return Ok(());
        }
        Intake::Query(query) => query,
    };

    info!(
        "Received topic from {} in channel {}: {query}",
        message.author_id, message.channel_id
    );

    let answer = {
        let _typing = start_typing(Arc::clone(sink), message.channel_id);
        completion.complete(&query).await
    };

    let delivered = deliver_answer(&**sink, message.channel_id, answer, reply_to).await?;
    info!(
        "Replied to {} in channel {} with {delivered} message(s)",
        message.author_id, message.channel_id
    );

    Ok(())
}
