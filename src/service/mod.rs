use std::sync::Arc;

use crate::config::AppConfig;

pub mod dialogue;
mod entitlement;
mod error;
pub mod feed;
pub mod generator;
pub mod http;
mod interaction;
mod language;
mod ratelimit;
pub mod render;
mod room;
mod user;

pub use entitlement::{EntitlementPolicy, Feature, Tier};
pub use error::ServiceError;
pub use interaction::{HistoryEntry, InteractionLog, InteractionRecord};
pub use language::{resolve_language, Language};
pub use ratelimit::QuotaLedger;
pub use room::RoomRegistry;
pub use user::*;

use feed::{FeedFetcher, RssFetcher};
use generator::{OpenAiConfig, OpenAiGenerator, TextGenerator};
use render::{DocumentRenderer, DocumentService};

/// Shared state and collaborators behind the conversation engine.
#[derive(Clone)]
pub struct ServiceRegistry {
    pub users: UserStore,
    pub ledger: QuotaLedger,
    pub policy: EntitlementPolicy,
    pub interactions: InteractionLog,
    pub rooms: RoomRegistry,
    pub generator: Arc<dyn TextGenerator>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub feed: Arc<dyn FeedFetcher>,
}

impl ServiceRegistry {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing service registry");

        let client = http::build_client(config.generator.timeout())?;

        let generator = OpenAiGenerator::new(
            client.clone(),
            OpenAiConfig {
                api_key: config.generator.api_key.clone(),
                base_url: config.generator.base_url.clone(),
                model: config.generator.model.clone(),
                timeout: config.generator.timeout(),
            },
        );

        let registry = Self::with_collaborators(
            config,
            Arc::new(generator),
            Arc::new(DocumentService::new()),
            Arc::new(RssFetcher::new(client)),
        );

        info!("Service registry initialized");

        Ok(registry)
    }

    /// Builds the registry around the given generator, renderer and feed.
    pub fn with_collaborators(
        config: &AppConfig,
        generator: Arc<dyn TextGenerator>,
        renderer: Arc<dyn DocumentRenderer>,
        feed: Arc<dyn FeedFetcher>,
    ) -> Self {
        Self {
            users: UserStore::new(
                config.access.admin_ids.clone(),
                config.access.tier_overrides.clone(),
            ),
            ledger: QuotaLedger::new(config.access.quota_free, config.access.quota_basic),
            policy: EntitlementPolicy::default(),
            interactions: InteractionLog::new(
                config.interaction.history_capacity,
                config.interaction.analytics_capacity,
            ),
            rooms: RoomRegistry::new(),
            generator,
            renderer,
            feed,
        }
    }
}
