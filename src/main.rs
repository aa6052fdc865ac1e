use anyhow::Result;
use dotenvy::dotenv;
use homework_status_bot::api::PracticumClient;
use homework_status_bot::bot::TelegramNotifier;
use homework_status_bot::config::{BotConfig, Settings};
use homework_status_bot::logging::init_logging;
use homework_status_bot::poller::{Poller, SystemClock};
use teloxide::Bot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("Starting homework status bot...");

    let config = init_config();
    info!(
        endpoint = %config.endpoint,
        retry_period_secs = config.retry_period.as_secs(),
        "Configuration loaded successfully."
    );

    let source = PracticumClient::new(&config);
    let bot = Bot::new(config.telegram_token.clone());
    let notifier = TelegramNotifier::new(bot, config.chat.clone());

    Poller::new(source, notifier, SystemClock, config.retry_period)
        .run()
        .await;

    Ok(())
}

/// Loads and validates configuration, terminating the process when it is unusable.
fn init_config() -> BotConfig {
    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            error!(severity = "CRITICAL", "Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match settings.into_bot_config() {
        Ok(config) => config,
        Err(e) => {
            error!(severity = "CRITICAL", "Configuration is unusable, shutting down: {}", e);
            std::process::exit(1);
        }
    }
}
