//! Answers topics posted to the scope channel.

mod answer;
mod command;
mod handler;
mod typing;

pub use answer::deliver_answer;
pub use command::truth_commands;
pub use handler::handle_message;
pub use typing::{TypingGuard, start_typing};

/// Posted instead of an empty completion.
const EMPTY_ANSWER: &str = "No answer.";

/// Prefix marking an error report in the channel.
const ERROR_PREFIX: &str = "❌";
