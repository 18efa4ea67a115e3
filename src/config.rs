use std::env;
use std::num::NonZeroU64;
use std::time::Duration;

use log::{debug, error, info};
use poise::serenity_prelude::ChannelId;

use crate::error::{BotError, Result};
use crate::intake::TriggerMode;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub openai_api_key: String,
    pub channel_id: ChannelId,
    pub health_port: u16,
    pub trigger_mode: TriggerMode,
    pub openai_model: String,
    pub openai_base_url: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| {
            get(name).ok_or_else(|| {
                error!("Failed to load {name} from environment");
                BotError::MissingEnvVar { name }
            })
        };

        let discord_token = require("DISCORD_TOKEN")?;
        let openai_api_key = require("OPENAI_API_KEY")?;
        let channel_id = parse_channel_id(&require("TRUTH_CHANNEL_ID")?)?;

        let health_port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| BotError::Config(format!("PORT '{raw}' is not a valid port: {e}")))?,
            None => DEFAULT_PORT,
        };

        let trigger_mode = match get("TRIGGER_MODE") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                BotError::Config(format!(
                    "TRIGGER_MODE '{raw}' must be 'command' or 'mention'"
                ))
            })?,
            None => TriggerMode::default(),
        };

        let openai_model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let openai_base_url = get("OPENAI_BASE_URL")
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |url| url.trim_end_matches('/').to_string());

        let timeout_secs = match get("OPENAI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                BotError::Config(format!("OPENAI_TIMEOUT_SECS '{raw}' is not a number: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("OpenAI API key length: {} characters", openai_api_key.len());
        debug!("Scope channel: {channel_id}");
        debug!("Trigger mode: {trigger_mode}");
        debug!("OpenAI model: {openai_model} at {openai_base_url}");

        Ok(Self {
            discord_token,
            openai_api_key,
            channel_id,
            health_port,
            trigger_mode,
            openai_model,
            openai_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_channel_id(raw: &str) -> Result<ChannelId> {
    raw.trim()
        .parse::<NonZeroU64>()
        .map(|id| ChannelId::new(id.get()))
        .map_err(|e| {
            BotError::Config(format!(
                "TRUTH_CHANNEL_ID '{raw}' is not a valid channel id: {e}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn required() -> HashMap<String, String> {
        env_with(&[
            ("DISCORD_TOKEN", "discord-token"),
            ("OPENAI_API_KEY", "sk-test"),
            ("TRUTH_CHANNEL_ID", "123456789"),
        ])
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn loads_required_values_with_defaults() -> Result<()> {
        let config = load(&required())?;
        assert_eq!(config.discord_token, "discord-token");
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.channel_id, ChannelId::new(123_456_789));
        assert_eq!(config.health_port, 8080);
        assert_eq!(config.trigger_mode, TriggerMode::Command);
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn each_required_variable_is_enforced() {
        for name in ["DISCORD_TOKEN", "OPENAI_API_KEY", "TRUTH_CHANNEL_ID"] {
            let mut vars = required();
            vars.remove(name);
            match load(&vars) {
                Err(BotError::MissingEnvVar { name: missing }) => assert_eq!(missing, name),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut vars = required();
        vars.insert("OPENAI_API_KEY".to_string(), "   ".to_string());
        assert!(matches!(
            load(&vars),
            Err(BotError::MissingEnvVar {
                name: "OPENAI_API_KEY"
            })
        ));
    }

    #[test]
    fn rejects_zero_and_garbage_channel_ids() {
        for raw in ["0", "general", "-4"] {
            let mut vars = required();
            vars.insert("TRUTH_CHANNEL_ID".to_string(), raw.to_string());
            assert!(matches!(load(&vars), Err(BotError::Config(_))), "{raw}");
        }
    }

    #[test]
    fn optional_overrides_are_applied() -> Result<()> {
        let mut vars = required();
        vars.extend(env_with(&[
            ("PORT", "3000"),
            ("TRIGGER_MODE", "Mention"),
            ("OPENAI_MODEL", "gpt-3.5-turbo"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("OPENAI_TIMEOUT_SECS", "15"),
        ]));
        let config = load(&vars)?;
        assert_eq!(config.health_port, 3000);
        assert_eq!(config.trigger_mode, TriggerMode::Mention);
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.openai_base_url, "http://localhost:9000/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        Ok(())
    }

    #[test]
    fn unknown_trigger_mode_is_a_config_error() {
        let mut vars = required();
        vars.insert("TRIGGER_MODE".to_string(), "telepathy".to_string());
        assert!(matches!(load(&vars), Err(BotError::Config(_))));
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let mut vars = required();
        vars.insert("PORT".to_string(), "99999".to_string());
        assert!(matches!(load(&vars), Err(BotError::Config(_))));
    }
}
