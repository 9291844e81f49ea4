use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    pub user_id: u64,
    pub question: String,
    pub answer: String,
    pub feature: String,
    pub timestamp: DateTime<Utc>,
}

/// The `{q, a}` pair shape used by history exports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub q: String,
    pub a: String,
}

impl From<&InteractionRecord> for HistoryEntry {
    fn from(record: &InteractionRecord) -> Self {
        Self {
            q: record.question.clone(),
            a: record.answer.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsEvent {
    pub user_id: u64,
    pub feature: String,
    pub timestamp: DateTime<Utc>,
}
