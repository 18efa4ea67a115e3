//! Decides which inbound messages get an answer.

mod filter;
mod trigger;

pub use filter::{Intake, IntakeFilter};
pub use trigger::{COMMAND_PREFIX, TriggerMode};
