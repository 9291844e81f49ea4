use std::sync::Arc;

use crate::{
    config::AppConfig,
    engine::{Engine, EngineSettings},
    error::BotResult,
    service::ServiceRegistry,
};

/// Shared by every handler as a dptree dependency.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Engine,
}

impl AppState {
    pub fn new(config: AppConfig) -> BotResult<Self> {
        let services = ServiceRegistry::new(&config)?;
        let engine = Engine::new(services, EngineSettings::from(&config.content));
        Ok(Self::with_engine(config, engine))
    }

    pub fn with_engine(config: AppConfig, engine: Engine) -> Self {
        Self {
            config: Arc::new(config),
            engine,
        }
    }
}
