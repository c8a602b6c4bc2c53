use serde::Serialize;

use super::domain::{HoldPeriod, RiskLevel};

/// Score bracket with the payout terms attached to it. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyTier {
    pub min_score: u8,
    pub max_score: u8,
    pub risk_level: RiskLevel,
    pub hold_period: HoldPeriod,
    pub reserve_percentage: u8,
    pub label: &'static str,
}

impl PolicyTier {
    pub fn contains(&self, score: u8) -> bool {
        score >= self.min_score && score <= self.max_score
    }
}

/// Ordered, contiguous tier table covering 0..=100.
#[derive(Debug, Clone)]
pub struct PolicyMapper {
    tiers: Vec<PolicyTier>,
}

impl Default for PolicyMapper {
    fn default() -> Self {
        Self::standard()
    }
}

impl PolicyMapper {
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                PolicyTier {
                    min_score: 0,
                    max_score: 20,
                    risk_level: RiskLevel::Low,
                    hold_period: HoldPeriod::Immediate,
                    reserve_percentage: 0,
                    label: "Low Risk - Trusted Merchant",
                },
                PolicyTier {
                    min_score: 21,
                    max_score: 40,
                    risk_level: RiskLevel::MediumLow,
                    hold_period: HoldPeriod::SevenDays,
                    reserve_percentage: 0,
                    label: "Medium-Low Risk - Standard Processing",
                },
                PolicyTier {
                    min_score: 41,
                    max_score: 60,
                    risk_level: RiskLevel::Medium,
                    hold_period: HoldPeriod::FourteenDays,
                    reserve_percentage: 10,
                    label: "Medium Risk - Enhanced Monitoring",
                },
                PolicyTier {
                    min_score: 61,
                    max_score: 80,
                    risk_level: RiskLevel::High,
                    hold_period: HoldPeriod::FortyFiveDays,
                    reserve_percentage: 20,
                    label: "High Risk - Requires Review",
                },
                PolicyTier {
                    min_score: 81,
                    max_score: 100,
                    risk_level: RiskLevel::Critical,
                    hold_period: HoldPeriod::FortyFiveDays,
                    reserve_percentage: 20,
                    label: "Critical Risk - Manual Approval Required",
                },
            ],
        }
    }

    pub fn tiers(&self) -> &[PolicyTier] {
        &self.tiers
    }

    /// Callers pass a score already clamped to 0..=100. An unmatched score falls back to the
    /// most severe tier.
    pub fn tier_for(&self, score: u8) -> &PolicyTier {
        self.tiers
            .iter()
            .find(|tier| tier.contains(score))
            .unwrap_or_else(|| self.most_severe())
    }

    fn most_severe(&self) -> &PolicyTier {
        &self.tiers[self.tiers.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_land_in_expected_tiers() {
        let mapper = PolicyMapper::standard();
        let cases = [
            (0, RiskLevel::Low),
            (20, RiskLevel::Low),
            (21, RiskLevel::MediumLow),
            (40, RiskLevel::MediumLow),
            (41, RiskLevel::Medium),
            (60, RiskLevel::Medium),
            (61, RiskLevel::High),
            (80, RiskLevel::High),
            (81, RiskLevel::Critical),
            (100, RiskLevel::Critical),
        ];

        for (score, expected) in cases {
            assert_eq!(mapper.tier_for(score).risk_level, expected, "score {score}");
        }
    }

    #[test]
    fn every_score_maps_to_exactly_one_tier() {
        let mapper = PolicyMapper::standard();
        for score in 0..=100u8 {
            let matches = mapper
                .tiers()
                .iter()
                .filter(|tier| tier.contains(score))
                .count();
            assert_eq!(matches, 1, "score {score} matched {matches} tiers");
        }
    }

    #[test]
    fn tiers_are_contiguous_and_reserve_never_drops() {
        let mapper = PolicyMapper::standard();
        let tiers = mapper.tiers();

        assert_eq!(tiers.first().map(|tier| tier.min_score), Some(0));
        assert_eq!(tiers.last().map(|tier| tier.max_score), Some(100));
        for pair in tiers.windows(2) {
            assert_eq!(pair[0].max_score + 1, pair[1].min_score);
            assert!(pair[0].reserve_percentage <= pair[1].reserve_percentage);
            assert!(pair[0].risk_level < pair[1].risk_level);
        }
    }

    #[test]
    fn out_of_range_scores_fall_back_to_critical() {
        let mapper = PolicyMapper::standard();
        let tier = mapper.tier_for(150);
        assert_eq!(tier.risk_level, RiskLevel::Critical);
        assert_eq!(tier.hold_period, HoldPeriod::FortyFiveDays);
        assert_eq!(tier.reserve_percentage, 20);
    }

    #[test]
    fn payout_terms_match_each_tier() {
        let mapper = PolicyMapper::standard();
        let terms: Vec<(HoldPeriod, u8)> = mapper
            .tiers()
            .iter()
            .map(|tier| (tier.hold_period, tier.reserve_percentage))
            .collect();

        assert_eq!(
            terms,
            vec![
                (HoldPeriod::Immediate, 0),
                (HoldPeriod::SevenDays, 0),
                (HoldPeriod::FourteenDays, 10),
                (HoldPeriod::FortyFiveDays, 20),
                (HoldPeriod::FortyFiveDays, 20),
            ]
        );
    }
}
