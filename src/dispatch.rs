//! Splitting long answers into Discord-sized messages and sending them.

mod chunk;
mod sender;

pub use chunk::{MESSAGE_LIMIT, split_message};
pub use sender::dispatch;
