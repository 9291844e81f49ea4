use std::time::Duration;

use teloxide::prelude::*;
use teloxide::Bot;

use crate::error::{BotResult, HandlerResult};
use crate::handler::get_handler;
use crate::state::AppState;

pub struct BotService {
    pub bot: Bot,
    pub state: AppState,
}

impl BotService {
    pub fn new(state: AppState) -> BotResult<Self> {
        // teloxide pins its own reqwest, so its client is built from its settings.
        let client = teloxide::net::default_reqwest_settings()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(anyhow::Error::from)?;
        let bot = Bot::with_client(state.config.telegram.0.clone(), client);

        Ok(Self { bot, state })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        let bot = self.bot.clone();

        crate::command::setup_user_commands(&bot).await?;

        Dispatcher::builder(bot, get_handler())
            .dependencies(dptree::deps![self.state.clone()])
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
