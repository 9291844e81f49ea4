use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::service::{dialogue::model::DialogueState, entitlement::Tier, ratelimit::DailyUsage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub language: String,
    pub country: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastQuiz {
    pub topic: String,
    pub content: String,
}

/// Working memory for the current process lifetime; `/resetcontext` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMemory {
    pub last_quiz: Option<LastQuiz>,
    pub last_reply: Option<String>,
    pub support_mode: bool,
    pub profile_prompted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub rating: u8,
    pub stress: u8,
    pub worry: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub went_well: String,
    pub challenge: String,
    pub tomorrow: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Everything the bot knows about one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub tier: Tier,
    pub usage: DailyUsage,
    pub progress_count: u64,
    pub profile: Option<Profile>,
    pub session: SessionMemory,
    pub dialogue: DialogueState,
    /// Bumped by cancel/reset so late generator results can be recognised and dropped.
    pub cancel_epoch: u64,
    pub moods: Vec<MoodEntry>,
    pub reflections: Vec<Reflection>,
    pub plans: Vec<DailyPlan>,
    pub metrics: BTreeMap<String, Vec<MetricPoint>>,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self {
            tier: Tier::Free,
            usage: DailyUsage::new(Utc::now().date_naive()),
            progress_count: 0,
            profile: None,
            session: SessionMemory::default(),
            dialogue: DialogueState::Idle,
            cancel_epoch: 0,
            moods: Vec::new(),
            reflections: Vec::new(),
            plans: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }
}

impl UserRecord {
    pub fn profile_language(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.language.as_str())
    }

    pub fn profile_level(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.level.as_str())
    }

    /// Drops the active dialogue and any result still being generated for it.
    pub fn abandon_dialogue(&mut self) {
        self.dialogue = DialogueState::Idle;
        self.cancel_epoch += 1;
    }

    /// Forgets the profile, working memory and active dialogue. Tier, usage,
    /// progress and collected wellbeing data are kept.
    pub fn reset_context(&mut self) {
        self.profile = None;
        self.session = SessionMemory::default();
        self.abandon_dialogue();
    }

    /// One plan per day; a new plan for the same date replaces the old one.
    pub fn save_plan(&mut self, plan: DailyPlan) {
        self.plans.retain(|p| p.date != plan.date);
        self.plans.push(plan);
    }

    pub fn record_metric(&mut self, name: &str, point: MetricPoint) {
        self.metrics.entry(name.to_lowercase()).or_default().push(point);
    }
}
