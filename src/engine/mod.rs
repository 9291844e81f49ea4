//! Transport-independent conversation engine.
//!
//! [`Engine::handle`] takes one [`InboundEvent`] and returns the replies to send.
//! All per-user state is read and written under that user's record lock, which is
//! released while the text generator runs.

mod commands;
mod event;
mod flow;
mod intent;
mod outcome;
mod prompts;


pub use event::{ChatKind, InboundEvent, Reply};
pub use outcome::AssistError;

use chrono::Utc;
use teloxide::utils::command::{BotCommands, ParseError};

use crate::command::Command;
use crate::config::ContentConfig;
use crate::service::{Feature, ServiceRegistry, UserRecord};

#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub upgrade_url: String,
    pub guideline_feed_url: String,
    pub guideline_feed_items: usize,
}

impl From<&ContentConfig> for EngineSettings {
    fn from(config: &ContentConfig) -> Self {
        Self {
            upgrade_url: config.upgrade_url.clone(),
            guideline_feed_url: config.guideline_feed_url.clone(),
            guideline_feed_items: config.guideline_feed_items,
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    services: ServiceRegistry,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(services: ServiceRegistry, settings: EngineSettings) -> Self {
        Self { services, settings }
    }

    #[cfg(test)]
    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub async fn handle(&self, event: InboundEvent) -> Vec<Reply> {
        if event.is_command() {
            return self.dispatch_command(&event).await;
        }

        let text = match self.addressed_text(&event) {
            Addressed::Yes(text) => text,
            Addressed::No => {
                debug!("Ignoring unaddressed group message from {}", event.user_id);
                return Vec::new();
            }
        };

        if let Some(photo) = event.photo {
            let caption = text.filter(|t| !t.is_empty());
            return self.handle_photo(event.user_id, caption, photo).await;
        }

        match text {
            Some(text) => self.handle_text(event.user_id, text).await,
            None => Vec::new(),
        }
    }

    /// Whether a photo in `event` would reach the image analysis, so the transport
    /// only downloads the ones that will be used.
    pub async fn wants_photo(&self, event: &InboundEvent) -> bool {
        if event.is_command() || matches!(self.addressed_text(event), Addressed::No) {
            return false;
        }

        let is_admin = self.services.users.is_admin(event.user_id);
        let record = self.services.users.record(event.user_id);
        let tier = record.lock().await.tier;
        self.services.policy.check(tier, is_admin, Feature::ImageAnalysis).is_ok()
    }

    async fn dispatch_command(&self, event: &InboundEvent) -> Vec<Reply> {
        let text = event.text.as_deref().unwrap_or_default().trim();
        let bot_username = event.bot_username.as_deref().unwrap_or_default();

        match Command::parse(text, bot_username) {
            Ok(command) => {
                debug!("User {} sent {:?}", event.user_id, command);
                self.handle_command(event.user_id, command).await
            }
            Err(ParseError::WrongBotName(name)) => {
                debug!("Ignoring command addressed to {}", name);
                Vec::new()
            }
            Err(e) => {
                debug!("Unrecognised command {:?}: {}", text, e);
                vec![Reply::text(t!("commands.unknown_command"))]
            }
        }
    }

    /// Private chats are always addressed. In groups the bot must be mentioned or
    /// replied to, and its username must be known to recognise a mention.
    ///
    /// Blank text is passed on so an active flow can ask for a real answer.
    fn addressed_text(&self, event: &InboundEvent) -> Addressed {
        let text = event.text.as_deref().map(str::trim);

        match event.chat_kind {
            ChatKind::Private => Addressed::Yes(text.map(str::to_string)),
            ChatKind::Group => {
                let Some(username) = event.bot_username.as_deref() else {
                    return Addressed::No;
                };
                match intent::addressed_text(text.unwrap_or_default(), username, event.reply_to_bot) {
                    Some(stripped) => Addressed::Yes(Some(stripped)),
                    None => Addressed::No,
                }
            }
        }
    }

    /// Admins pass; everyone else needs the feature's minimum tier.
    fn entitle(&self, user_id: u64, user: &UserRecord, feature: Feature) -> Result<(), AssistError> {
        let is_admin = self.services.users.is_admin(user_id);
        self.services
            .policy
            .check(user.tier, is_admin, feature)
            .map_err(|min_tier| {
                warn!(
                    "User {} (tier {}) denied {}; requires {}",
                    user_id, user.tier, feature, min_tier
                );
                AssistError::FeatureRestricted { min_tier }
            })
    }

    /// Takes one unit of today's quota and counts the request towards progress.
    fn charge(&self, user_id: u64, user: &mut UserRecord) -> Result<(), AssistError> {
        let is_admin = self.services.users.is_admin(user_id);
        let tier = user.tier;
        let today = Utc::now().date_naive();

        if self.services.ledger.try_consume(&mut user.usage, tier, is_admin, today) {
            user.progress_count += 1;
            return Ok(());
        }

        let quota = self.services.ledger.quota(tier).unwrap_or_default();
        warn!("User {} exceeded the daily quota of {} ({})", user_id, quota, tier);
        Err(AssistError::QuotaExceeded { quota })
    }
}

enum Addressed {
    Yes(Option<String>),
    No,
}
