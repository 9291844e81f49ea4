use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::time::Duration;

use crate::service::Tier;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GUIDELINE_FEED_URL: &str = "https://www.ecdc.europa.eu/en/latest-news/rss";
const DEFAULT_UPGRADE_URL: &str = "https://your-payment-link.com";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("Invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub generator: GeneratorConfig,
    pub access: AccessConfig,
    pub content: ContentConfig,
    pub interaction: InteractionConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig(pub String);

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AccessConfig {
    pub admin_ids: HashSet<u64>,
    /// Seeds user tiers at startup, standing in for a billing integration.
    pub tier_overrides: HashMap<u64, Tier>,
    pub quota_free: u32,
    pub quota_basic: u32,
}

#[derive(Clone, Debug)]
pub struct ContentConfig {
    pub locale: String,
    pub guideline_feed_url: String,
    pub guideline_feed_items: usize,
    pub upgrade_url: String,
}

#[derive(Clone, Debug)]
pub struct InteractionConfig {
    /// Ring buffer size of the global analytics stream.
    pub analytics_capacity: usize,
    /// Most recent records kept per user for history exports.
    pub history_capacity: usize,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        info!("Building AppConfig...");
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = AppConfig {
            telegram: TelegramConfig(get("TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?),
            generator: GeneratorConfig {
                api_key: get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?,
                base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                timeout_secs: parse_or("GENERATION_TIMEOUT_SECS", get("GENERATION_TIMEOUT_SECS"), 60)?,
            },
            access: AccessConfig {
                admin_ids: parse_admin_ids(get("ADMIN_IDS").as_deref().unwrap_or_default())?,
                tier_overrides: parse_tier_overrides(get("TIER_OVERRIDES").as_deref().unwrap_or_default())?,
                quota_free: parse_or("QUOTA_FREE", get("QUOTA_FREE"), 1)?,
                quota_basic: parse_or("QUOTA_BASIC", get("QUOTA_BASIC"), 5)?,
            },
            content: ContentConfig {
                locale: get("BOT_LOCALE").unwrap_or_else(|| "lt".to_string()),
                guideline_feed_url: get("GUIDELINE_FEED_URL")
                    .unwrap_or_else(|| DEFAULT_GUIDELINE_FEED_URL.to_string()),
                guideline_feed_items: parse_or("GUIDELINE_FEED_ITEMS", get("GUIDELINE_FEED_ITEMS"), 3)?,
                upgrade_url: get("UPGRADE_URL").unwrap_or_else(|| DEFAULT_UPGRADE_URL.to_string()),
            },
            interaction: InteractionConfig {
                analytics_capacity: parse_or("ANALYTICS_CAPACITY", get("ANALYTICS_CAPACITY"), 10_000)?,
                history_capacity: parse_or("HISTORY_CAPACITY", get("HISTORY_CAPACITY"), 500)?,
            },
        };

        if config.generator.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "GENERATION_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        info!(
            "AppConfig ready ({} admins, {} tier overrides, locale {})",
            config.access.admin_ids.len(),
            config.access.tier_overrides.len(),
            config.content.locale
        );

        Ok(config)
    }
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// `"1, 2,3"` into a set of ids.
fn parse_admin_ids(raw: &str) -> Result<HashSet<u64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "ADMIN_IDS",
                value: id.to_string(),
            })
        })
        .collect()
}

/// `"42:2,43:premium"` into user id to tier.
fn parse_tier_overrides(raw: &str) -> Result<HashMap<u64, Tier>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let invalid = || ConfigError::Invalid {
                key: "TIER_OVERRIDES",
                value: pair.to_string(),
            };
            let (id, tier) = pair.split_once(':').ok_or_else(invalid)?;
            let id = id.trim().parse::<u64>().map_err(|_| invalid())?;
            let tier = tier.trim().parse::<Tier>().map_err(|_| invalid())?;
            Ok((id, tier))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_source(source(&[("TELEGRAM_TOKEN", "t"), ("OPENAI_API_KEY", "k")])).unwrap();

        assert_eq!(config.telegram.0, "t");
        assert_eq!(config.generator.model, "gpt-4o-mini");
        assert_eq!(config.generator.timeout(), Duration::from_secs(60));
        assert!(config.access.admin_ids.is_empty());
        assert_eq!(config.access.quota_free, 1);
        assert_eq!(config.access.quota_basic, 5);
        assert_eq!(config.content.locale, "lt");
        assert_eq!(config.content.guideline_feed_items, 3);
        assert_eq!(config.content.upgrade_url, DEFAULT_UPGRADE_URL);
        assert_eq!(config.interaction.analytics_capacity, 10_000);
        assert_eq!(config.interaction.history_capacity, 500);
    }

    #[test]
    fn test_missing_required_keys() {
        assert_eq!(
            AppConfig::from_source(source(&[("OPENAI_API_KEY", "k")])).unwrap_err(),
            ConfigError::Missing("TELEGRAM_TOKEN")
        );
        assert_eq!(
            AppConfig::from_source(source(&[("TELEGRAM_TOKEN", "t"), ("OPENAI_API_KEY", "  ")])).unwrap_err(),
            ConfigError::Missing("OPENAI_API_KEY")
        );
    }

    #[test]
    fn test_access_lists() {
        let config = AppConfig::from_source(source(&[
            ("TELEGRAM_TOKEN", "t"),
            ("OPENAI_API_KEY", "k"),
            ("ADMIN_IDS", "712878075, 10"),
            ("TIER_OVERRIDES", "42:2, 43:premium"),
            ("QUOTA_BASIC", "7"),
        ]))
        .unwrap();

        assert_eq!(config.access.admin_ids, HashSet::from([712878075, 10]));
        assert_eq!(config.access.tier_overrides.get(&42), Some(&Tier::ProStudent));
        assert_eq!(config.access.tier_overrides.get(&43), Some(&Tier::Premium));
        assert_eq!(config.access.quota_basic, 7);
    }

    #[test]
    fn test_invalid_values() {
        let base = [("TELEGRAM_TOKEN", "t"), ("OPENAI_API_KEY", "k")];

        for (key, value) in [
            ("ADMIN_IDS", "1,abc"),
            ("TIER_OVERRIDES", "42"),
            ("TIER_OVERRIDES", "42:9"),
            ("QUOTA_FREE", "-1"),
            ("GENERATION_TIMEOUT_SECS", "0"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push((key, value));
            assert!(
                matches!(AppConfig::from_source(source(&pairs)), Err(ConfigError::Invalid { .. })),
                "{key}={value} should be rejected"
            );
        }
    }
}
