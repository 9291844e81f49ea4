mod model;

pub use model::{AnalyticsEvent, HistoryEntry, InteractionRecord};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use dashmap::DashMap;

pub const DEFAULT_FEATURE: &str = "message";

/// Q/A history per user plus a global analytics stream.
///
/// History keeps the newest `history_capacity` records per user. The event stream is
/// a ring buffer of `analytics_capacity` events, while the per-user counters used by
/// the admin report stay exact.
#[derive(Clone)]
pub struct InteractionLog {
    history: Arc<DashMap<u64, VecDeque<InteractionRecord>>>,
    counts: Arc<DashMap<u64, u64>>,
    events: Arc<Mutex<VecDeque<AnalyticsEvent>>>,
    history_capacity: usize,
    analytics_capacity: usize,
}

impl InteractionLog {
    pub fn new(history_capacity: usize, analytics_capacity: usize) -> Self {
        info!(
            "Initializing interaction log (history: {}, analytics: {})",
            history_capacity, analytics_capacity
        );
        Self {
            history: Arc::new(DashMap::new()),
            counts: Arc::new(DashMap::new()),
            events: Arc::new(Mutex::new(VecDeque::with_capacity(analytics_capacity.min(1024)))),
            history_capacity: history_capacity.max(1),
            analytics_capacity: analytics_capacity.max(1),
        }
    }

    pub fn record(&self, user_id: u64, question: &str, answer: &str, feature: Option<&str>) {
        let feature = feature.filter(|f| !f.is_empty()).unwrap_or(DEFAULT_FEATURE);
        let timestamp = Utc::now();

        {
            let mut history = self.history.entry(user_id).or_default();
            if history.len() >= self.history_capacity {
                history.pop_front();
            }
            history.push_back(InteractionRecord {
                user_id,
                question: question.to_string(),
                answer: answer.to_string(),
                feature: feature.to_string(),
                timestamp,
            });
        }

        *self.counts.entry(user_id).or_insert(0) += 1;

        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        if events.len() >= self.analytics_capacity {
            events.pop_front();
        }
        events.push_back(AnalyticsEvent {
            user_id,
            feature: feature.to_string(),
            timestamp,
        });
    }

    /// Chronological history for one user.
    pub fn history(&self, user_id: u64) -> Vec<InteractionRecord> {
        self.history
            .get(&user_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every interaction recorded for one user, including those dropped from history.
    pub fn total(&self, user_id: u64) -> u64 {
        self.counts.get(&user_id).map_or(0, |count| *count)
    }

    /// Interaction count per user, ordered by user id.
    pub fn counts_by_user(&self) -> Vec<(u64, u64)> {
        let mut counts: Vec<(u64, u64)> = self.counts.iter().map(|e| (*e.key(), *e.value())).collect();
        counts.sort_unstable_by_key(|(user_id, _)| *user_id);
        counts
    }

    pub fn recent_events(&self) -> Vec<AnalyticsEvent> {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.iter().cloned().collect()
    }
}
