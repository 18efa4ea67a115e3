#[tokio::main]
async fn main() -> truthbot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("truthbot=info,serenity=warn"),
    )
    .init();
    log::info!("Starting truthbot Discord bot");

    match truthbot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
