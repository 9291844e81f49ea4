use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Today's consumption for one user. `date` is a UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub count: u32,
}

impl DailyUsage {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, count: 0 }
    }

    /// Lazily starts a new day.
    pub fn roll_over(&mut self, today: NaiveDate) {
        if self.date != today {
            self.date = today;
            self.count = 0;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageInfo {
    pub used: u32,
    pub quota: Option<u32>, // None = unlimited
    pub remaining: Option<u32>,
    pub reset_in_secs: u64,
}
