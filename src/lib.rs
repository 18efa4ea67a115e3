pub mod bot;
pub mod config;
pub mod discord;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod intake;
pub mod lifecycle;
pub mod openai;
pub mod truth;
pub mod types;

pub use bot::run;
