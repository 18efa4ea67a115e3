//! Best-effort typing indicator while an answer is generated.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use poise::serenity_prelude::ChannelId;
use tokio::task::JoinHandle;

use crate::discord::ChatSink;

const TYPING_INTERVAL: Duration = Duration::from_secs(4);
const TYPING_REPEATS: usize = 3;

/// Stops the typing loop when dropped.
pub struct TypingGuard {
    task: JoinHandle<()>,
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Show "typing..." in `channel_id` every few seconds, a bounded number of times.
pub fn start_typing<S>(sink: Arc<S>, channel_id: ChannelId) -> TypingGuard
where
    S: ChatSink + ?Sized + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TYPING_INTERVAL);
        for _ in 0..TYPING_REPEATS {
            ticker.tick().await;
            if let Err(e) = sink.broadcast_typing(channel_id).await {
                debug!("Failed to broadcast typing indicator: {e}");
            }
        }
    });

    TypingGuard { task }
}
