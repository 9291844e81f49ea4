mod model;

pub use model::*;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{service::entitlement::Tier, storage::KeyedStore};

/// Per-user records plus the static admin set.
#[derive(Clone)]
pub struct UserStore {
    records: KeyedStore<u64, UserRecord>,
    admins: Arc<HashSet<u64>>,
    tier_overrides: Arc<HashMap<u64, Tier>>,
}

impl UserStore {
    pub fn new(admins: HashSet<u64>, tier_overrides: HashMap<u64, Tier>) -> Self {
        info!(
            "Initializing user store ({} admins, {} tier overrides)",
            admins.len(),
            tier_overrides.len()
        );
        Self {
            records: KeyedStore::new(1024),
            admins: Arc::new(admins),
            tier_overrides: Arc::new(tier_overrides),
        }
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admins.contains(&user_id)
    }

    /// Lock for one user's record. Hold the guard for the whole read-modify-write.
    pub fn record(&self, user_id: u64) -> Arc<Mutex<UserRecord>> {
        self.records.entry_with(&user_id, || UserRecord {
            tier: self.tier_overrides.get(&user_id).copied().unwrap_or_default(),
            ..UserRecord::default()
        })
    }

    /// Billing hook: the only way a tier changes at runtime.
    pub async fn set_tier(&self, user_id: u64, tier: Tier) {
        let record = self.record(user_id);
        record.lock().await.tier = tier;
        info!("User {} moved to tier {}", user_id, tier);
    }

    pub fn known_users(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_and_overrides() {
        let store = UserStore::new(HashSet::from([1]), HashMap::from([(2, Tier::Premium)]));

        assert!(store.is_admin(1));
        assert!(!store.is_admin(2));

        assert_eq!(store.record(3).lock().await.tier, Tier::Free);
        assert_eq!(store.record(2).lock().await.tier, Tier::Premium);
        assert_eq!(store.known_users(), 2);
    }

    #[tokio::test]
    async fn test_set_tier() {
        let store = UserStore::new(HashSet::new(), HashMap::new());
        store.set_tier(5, Tier::Basic).await;
        assert_eq!(store.record(5).lock().await.tier, Tier::Basic);
    }

    #[tokio::test]
    async fn test_reset_context_keeps_tier_and_usage() {
        let store = UserStore::new(HashSet::new(), HashMap::new());
        store.set_tier(5, Tier::Basic).await;

        let record = store.record(5);
        let mut user = record.lock().await;
        user.usage.count = 3;
        user.progress_count = 4;
        user.profile = Some(Profile {
            language: "en".into(),
            country: "lt".into(),
            level: "studentas".into(),
        });
        user.session.last_reply = Some("reply".into());
        let epoch = user.cancel_epoch;

        user.reset_context();

        assert_eq!(user.tier, Tier::Basic);
        assert_eq!(user.usage.count, 3);
        assert_eq!(user.progress_count, 4);
        assert!(user.profile.is_none());
        assert!(user.session.last_reply.is_none());
        assert_eq!(user.cancel_epoch, epoch + 1);
    }
}
