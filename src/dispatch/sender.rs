use log::{debug, warn};
use poise::serenity_prelude::ChannelId;

use crate::discord::ChatSink;
use crate::types::{MessageRef, OutboundChunk};

use super::chunk::{MESSAGE_LIMIT, split_message};

/// Send `text` to `channel_id` as a sequence of Discord-sized messages.
///
/// Only the first message is threaded onto `reply_to`. Blank chunks are never
/// sent, since Discord rejects them. A failed send is logged and the remaining
/// chunks are still attempted. Returns how many chunks were delivered.
pub async fn dispatch<S>(
    sink: &S,
    channel_id: ChannelId,
    text: &str,
    reply_to: Option<MessageRef>,
) -> usize
where
    S: ChatSink + ?Sized,
{
    let chunks: Vec<&str> = split_message(text, MESSAGE_LIMIT)
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect();
    let total = chunks.len();
    let mut delivered = 0;

    for (index, content) in chunks.into_iter().enumerate() {
        let chunk = if index == 0 {
            OutboundChunk::replying(content, reply_to)
        } else {
            OutboundChunk::plain(content)
        };

        match sink.send(channel_id, chunk).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(
                "Failed to send chunk {}/{total} to channel {channel_id}: {e}",
                index + 1
            ),
        }
    }

    debug!("Delivered {delivered}/{total} chunks to channel {channel_id}");
    delivered
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use poise::serenity_prelude::MessageId;

    use super::*;
    use crate::error::{BotError, Result};

    /// Records every chunk; fails the sends whose index is listed.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<OutboundChunk>>,
        attempts: Mutex<usize>,
        fail_on: Vec<usize>,
    }

    #[async_trait]
    impl ChatSink for RecordingSink {
        async fn send(&self, _: ChannelId, chunk: OutboundChunk) -> Result<()> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                *attempts += 1;
                *attempts - 1
            };
            if self.fail_on.contains(&attempt) {
                return Err(BotError::Gateway("send rejected".to_string()));
            }
            self.sent.lock().unwrap().push(chunk);
            Ok(())
        }

        async fn broadcast_typing(&self, _: ChannelId) -> Result<()> {
            Ok(())
        }
    }

    fn trigger() -> MessageRef {
        MessageRef {
            channel_id: ChannelId::new(7),
            message_id: MessageId::new(8),
        }
    }

    #[tokio::test]
    async fn only_first_chunk_is_a_reply() {
        let sink = RecordingSink::default();
        let text = "x".repeat(4500);

        let delivered = dispatch(&sink, ChannelId::new(7), &text, Some(trigger())).await;

        let sent = sink.sent.lock().unwrap();
        assert_eq!(delivered, 3);
        assert_eq!(sent[0].reply_to, Some(trigger()));
        assert!(sent[0].suppress_mention);
        assert!(sent[1..].iter().all(|c| c.reply_to.is_none() && !c.suppress_mention));
    }

    #[tokio::test]
    async fn chunks_arrive_in_order() {
        let sink = RecordingSink::default();
        let text = format!("{}\n{}", "a".repeat(1999), "b".repeat(1999));

        dispatch(&sink, ChannelId::new(7), &text, None).await;

        let sent = sink.sent.lock().unwrap();
        let rebuilt: String = sent.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(rebuilt, text);
        assert!(sent.iter().all(|c| c.reply_to.is_none()));
    }

    #[tokio::test]
    async fn failed_send_does_not_stop_the_rest() {
        let sink = RecordingSink {
            fail_on: vec![0],
            ..RecordingSink::default()
        };
        let text = "y".repeat(4500);

        let delivered = dispatch(&sink, ChannelId::new(7), &text, Some(trigger())).await;

        assert_eq!(delivered, 2);
        assert_eq!(*sink.attempts.lock().unwrap(), 3);
        let sent = sink.sent.lock().unwrap();
        assert!(sent.iter().all(|c| c.reply_to.is_none()));
    }

    #[tokio::test]
    async fn blank_chunks_are_never_sent() {
        let sink = RecordingSink::default();
        let text = format!("{}{}", " ".repeat(2000), "z".repeat(10));

        let delivered = dispatch(&sink, ChannelId::new(7), &text, Some(trigger())).await;

        assert_eq!(delivered, 1);
        assert_eq!(*sink.attempts.lock().unwrap(), 1);
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent[0].content, "z".repeat(10));
        assert_eq!(sent[0].reply_to, Some(trigger()));
    }

    #[tokio::test]
    async fn empty_text_sends_nothing() {
        let sink = RecordingSink::default();
        assert_eq!(dispatch(&sink, ChannelId::new(7), "", Some(trigger())).await, 0);
        assert_eq!(*sink.attempts.lock().unwrap(), 0);
    }
}
