mod model;

pub use model::{Feature, Tier};

/// Minimum tier per gated feature. Features missing here are open to every tier.
const FEATURE_MIN_TIER: &[(Feature, Tier)] = &[
    (Feature::Pdf, Tier::ProStudent),
    (Feature::Flashcards, Tier::ProStudent),
    (Feature::ImageAnalysis, Tier::Premium),
    (Feature::Rooms, Tier::Premium),
];

#[derive(Clone, Debug)]
pub struct EntitlementPolicy {
    table: Vec<(Feature, Tier)>,
}

impl Default for EntitlementPolicy {
    fn default() -> Self {
        Self::new(FEATURE_MIN_TIER.to_vec())
    }
}

impl EntitlementPolicy {
    pub fn new(table: Vec<(Feature, Tier)>) -> Self {
        Self { table }
    }

    pub fn min_tier(&self, feature: Feature) -> Tier {
        self.table
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::Free)
    }

    pub fn is_allowed(&self, tier: Tier, is_admin: bool, feature: Feature) -> bool {
        is_admin || tier >= self.min_tier(feature)
    }

    /// Like [`is_allowed`](Self::is_allowed) but hands back the tier the user would need.
    pub fn check(&self, tier: Tier, is_admin: bool, feature: Feature) -> Result<(), Tier> {
        if self.is_allowed(tier, is_admin, feature) {
            Ok(())
        } else {
            Err(self.min_tier(feature))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURES: [Feature; 4] = [
        Feature::Pdf,
        Feature::Flashcards,
        Feature::ImageAnalysis,
        Feature::Rooms,
    ];

    #[test]
    fn test_default_table() {
        let policy = EntitlementPolicy::default();
        assert_eq!(policy.min_tier(Feature::Pdf), Tier::ProStudent);
        assert_eq!(policy.min_tier(Feature::Flashcards), Tier::ProStudent);
        assert_eq!(policy.min_tier(Feature::ImageAnalysis), Tier::Premium);
        assert_eq!(policy.min_tier(Feature::Rooms), Tier::Premium);
    }

    #[test]
    fn test_missing_feature_is_open() {
        let policy = EntitlementPolicy::new(vec![(Feature::Rooms, Tier::Premium)]);
        assert_eq!(policy.min_tier(Feature::Pdf), Tier::Free);
        assert!(policy.is_allowed(Tier::Free, false, Feature::Pdf));
    }

    #[test]
    fn test_admin_bypasses_every_gate() {
        let policy = EntitlementPolicy::default();
        for feature in FEATURES {
            assert!(policy.is_allowed(Tier::Free, true, feature));
        }
    }

    #[test]
    fn test_allowed_is_monotonic_in_tier() {
        let policy = EntitlementPolicy::default();
        for feature in FEATURES {
            for (i, tier) in Tier::ALL.iter().enumerate() {
                if policy.is_allowed(*tier, false, feature) {
                    for higher in &Tier::ALL[i..] {
                        assert!(policy.is_allowed(*higher, false, feature), "{feature} at {higher}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_check_reports_required_tier() {
        let policy = EntitlementPolicy::default();
        assert_eq!(policy.check(Tier::Basic, false, Feature::Pdf), Err(Tier::ProStudent));
        assert_eq!(policy.check(Tier::ProStudent, false, Feature::Pdf), Ok(()));
    }
}
