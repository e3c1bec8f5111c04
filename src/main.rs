//! Fulfillment consultant bot — Entry Point
//!
//! Loads configuration and tariffs, then runs the Telegram bot and the web
//! API until SIGINT/SIGTERM.

mod assistant;
mod config;
mod dialog;
mod error;
mod events;
mod logging;
mod pricing;
mod tariffs;
mod telegram;
mod web;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use crate::assistant::openai::OpenAiAssistant;
use crate::assistant::{Assistant, AssistantError, DisabledAssistant};
use crate::config::Config;
use crate::dialog::Dialog;
use crate::events::bus::EventBus;
use crate::pricing::PricingCalculator;
use crate::tariffs::TariffBook;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if missing)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    logging::structured::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        telegram = config.telegram.bot_token.is_some(),
        assistant = config.assistant.api_key.is_some(),
        web = config.web.enabled,
        "fulfillment-bot starting"
    );

    let book = Arc::new(TariffBook::load(&config.tariffs.path)?);
    let calculator = PricingCalculator::new(book.clone());
    let event_bus = Arc::new(EventBus::new(256));

    let assistant: Arc<dyn Assistant> = match OpenAiAssistant::new(config.assistant.clone(), &book) {
        Ok(a) => {
            info!(model = %config.assistant.model, "AI assistant enabled");
            Arc::new(a)
        }
        Err(AssistantError::NotConfigured) => {
            warn!("OPENAI_API_KEY not set, AI assistant answers with the fallback text");
            Arc::new(DisabledAssistant)
        }
        Err(e) => return Err(e.into()),
    };

    let dialog = Arc::new(Dialog::new(book.clone()));

    let telegram_handle = match telegram::bot::TelegramBot::new(
        config.telegram.clone(),
        dialog,
        assistant,
        event_bus.clone(),
    ) {
        Some(bot) => Some(tokio::spawn(async move {
            if let Err(e) = bot.run().await {
                error!(error = %e, "telegram bot error");
            }
        })),
        None => {
            error!("TELEGRAM_BOT_TOKEN is not set, telegram bot disabled");
            None
        }
    };

    let web_handle = if config.web.enabled {
        let web_server = web::server::WebServer::new(config.web.clone(), calculator, event_bus.clone());
        Some(tokio::spawn(async move {
            if let Err(e) = web_server.start().await {
                error!(error = %e, "web server error");
            }
        }))
    } else {
        None
    };

    if telegram_handle.is_none() && web_handle.is_none() {
        warn!("nothing to run: no bot token and web API disabled");
        return Ok(());
    }

    info!("all subsystems started, waiting for shutdown signal");
    wait_for_shutdown().await?;

    for handle in [telegram_handle, web_handle].into_iter().flatten() {
        handle.abort();
    }
    info!("shutdown complete");
    Ok(())
}

async fn wait_for_shutdown() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => { res?; info!("received SIGINT"); }
            _ = sigterm.recv() => { info!("received SIGTERM"); }
        }
    }
    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("received SIGINT");
    }
    Ok(())
}
