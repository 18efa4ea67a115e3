//! Discord bot bootstrap, event routing and shutdown.

use std::sync::Arc;

use log::{debug, error, info, warn};
use poise::{
    Framework, FrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents, ShardManager},
};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::health::HealthServer;
use crate::intake::IntakeFilter;
use crate::lifecycle::{Lifecycle, Phase, SHUTDOWN_GRACE, shutdown_signal};
use crate::openai::OpenAiClient;
use crate::truth::{handle_message, truth_commands};
use crate::types::{BotIdentity, InboundMessage};

type GatewayTask = JoinHandle<std::result::Result<(), poise::serenity_prelude::Error>>;

/// Shared, read-only state handed to every event and command.
pub struct Data {
    filter: IntakeFilter,
    completion: OpenAiClient,
}

impl Data {
    #[must_use]
    pub fn filter(&self) -> &IntakeFilter {
        &self.filter
    }

    #[must_use]
    pub fn completion(&self) -> &OpenAiClient {
        &self.completion
    }
}

/// Run the Discord bot until a shutdown signal arrives.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;
    let mut lifecycle = Lifecycle::new();

    debug!("Initializing OpenAI client");
    let completion = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        &config.openai_base_url,
        config.request_timeout,
    )?;

    let health = HealthServer::start(config.health_port).await?;

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let scope = config.channel_id;
    let mode = config.trigger_mode;
    let (ready_tx, mut ready_rx) = oneshot::channel::<()>();

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: truth_commands(),
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord as {}", ready.user.name);
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");

                let identity = BotIdentity::new(ready.user.id);
                info!("Answering {mode} triggers in channel {scope}");
                let _ = ready_tx.send(());
                Ok(Data {
                    filter: IntakeFilter::new(identity, scope, mode),
                    completion,
                })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;
    let shard_manager = client.shard_manager.clone();

    info!("Starting Discord client");
    let mut gateway: GatewayTask = tokio::spawn(async move { client.start().await });

    let signal = shutdown_signal();
    tokio::pin!(signal);

    let mut gateway_joined = false;
    let mut failure = tokio::select! {
        joined = &mut gateway => {
            gateway_joined = true;
            Some(gateway_failure(joined))
        }
        ready = &mut ready_rx => match ready {
            Ok(()) => {
                lifecycle.advance(Phase::Connected)?;
                None
            }
            Err(_) => Some(BotError::Gateway("framework setup did not complete".to_string())),
        },
        () = &mut signal => None,
    };

    if failure.is_none() && lifecycle.phase() == Phase::Connected {
        failure = tokio::select! {
            joined = &mut gateway => {
                gateway_joined = true;
                Some(gateway_failure(joined))
            }
            () = &mut signal => None,
        };
    }

    match &failure {
        Some(e) => error!("Discord connection failed: {e}"),
        None => info!("Shutdown signal received, shutting down..."),
    }

    lifecycle.advance(Phase::ShuttingDown)?;
    shut_down(shard_manager, (!gateway_joined).then_some(gateway), health).await;
    lifecycle.advance(Phase::Stopped)?;

    failure.map_or(Ok(()), Err)
}

/// Stop every shard and the health endpoint, giving up after the grace period.
async fn shut_down(
    shard_manager: Arc<ShardManager>,
    gateway: Option<GatewayTask>,
    health: HealthServer,
) {
    let graceful = async {
        shard_manager.shutdown_all().await;

        if let Some(gateway) = gateway {
            match gateway.await {
                Ok(Ok(())) => debug!("Discord client stopped"),
                Ok(Err(e)) => warn!("Discord client stopped with error: {e}"),
                Err(e) => warn!("Discord client task failed: {e}"),
            }
        }

        if let Err(e) = health.shutdown().await {
            error!("Failed to stop health endpoint: {e}");
        }
    };

    if tokio::time::timeout(SHUTDOWN_GRACE, graceful).await.is_err() {
        warn!(
            "Shutdown did not finish within {} seconds",
            SHUTDOWN_GRACE.as_secs()
        );
    }
}

fn gateway_failure(
    joined: std::result::Result<
        std::result::Result<(), poise::serenity_prelude::Error>,
        JoinError,
    >,
) -> BotError {
    match joined {
        Ok(Ok(())) => BotError::Gateway("connection closed unexpectedly".to_string()),
        Ok(Err(e)) => e.into(),
        Err(e) => BotError::Gateway(format!("client task failed: {e}")),
    }
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> Result<()> {
    if let FullEvent::Message { new_message } = event {
        let message = InboundMessage::from(new_message);
        handle_message(&ctx.http, &message, &data.filter, &data.completion).await?;
    }
    Ok(())
}
