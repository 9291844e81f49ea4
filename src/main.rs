use bot::BotService;
use config::AppConfig;
use error::HandlerResult;
use state::AppState;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

mod bot;
mod command;
mod config;
mod engine;
mod error;
mod handler;
mod service;
mod state;
mod storage;
mod utils;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> HandlerResult<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = pretty_env_logger::try_init_timed();

    info!("Starting bot...");

    let config = AppConfig::from_env()?;
    rust_i18n::set_locale(&config.content.locale);

    info!("Initializing AppState...");
    let state = AppState::new(config)?;

    let bot_service = BotService::new(state)?;
    info!("Bot instance created");

    bot_service.start().await
}
