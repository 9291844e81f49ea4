mod model;

pub use model::{DailyUsage, UsageInfo};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::entitlement::Tier;

/// Per-tier daily request ceilings. `None` means unlimited.
#[derive(Clone, Debug)]
pub struct QuotaLedger {
    quotas: [Option<u32>; 4],
}

impl Default for QuotaLedger {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

impl QuotaLedger {
    pub fn new(free_quota: u32, basic_quota: u32) -> Self {
        info!(
            "Initializing quota ledger (free: {}, basic: {})",
            free_quota, basic_quota
        );
        Self {
            quotas: [Some(free_quota), Some(basic_quota), None, None],
        }
    }

    pub fn quota(&self, tier: Tier) -> Option<u32> {
        self.quotas[tier.level() as usize]
    }

    /// Consumes one unit of today's quota.
    ///
    /// Admins and unlimited tiers always pass and leave `usage` untouched. Otherwise
    /// the record is rolled over to `today` first, and a rejected request does not
    /// mutate the count.
    pub fn try_consume(&self, usage: &mut DailyUsage, tier: Tier, is_admin: bool, today: NaiveDate) -> bool {
        if is_admin {
            return true;
        }

        let Some(quota) = self.quota(tier) else {
            return true;
        };

        usage.roll_over(today);

        if usage.count >= quota {
            return false;
        }

        usage.count += 1;
        true
    }

    pub fn usage_info(&self, usage: &DailyUsage, tier: Tier, is_admin: bool, now: DateTime<Utc>) -> UsageInfo {
        let today = now.date_naive();
        let used = if usage.date == today { usage.count } else { 0 };
        let quota = if is_admin { None } else { self.quota(tier) };

        UsageInfo {
            used,
            quota,
            remaining: quota.map(|q| q.saturating_sub(used)),
            reset_in_secs: seconds_until_next_day(now),
        }
    }
}

fn seconds_until_next_day(now: DateTime<Utc>) -> u64 {
    let tomorrow = now.date_naive() + Duration::days(1);
    let midnight = tomorrow.and_hms_opt(0, 0, 0).map(|t| t.and_utc()).unwrap_or(now);
    (midnight - now).num_seconds().max(0) as u64
}
