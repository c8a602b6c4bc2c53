mod config;
pub(crate) mod rules;

pub use config::ScoringThresholds;

use serde::{Deserialize, Serialize};

use super::domain::MerchantSnapshot;
use rules::{AccountAgeBand, CategoryBand, ChargebackBand, KycStanding, RefundBand, VelocityBand};

pub const MAX_RISK_SCORE: u8 = 100;

/// Per-factor sub-scores. Each stays within its cap (30/25/20/15/10/5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FactorScore {
    pub chargeback: u8,
    pub account_age: u8,
    pub velocity: u8,
    pub category: u8,
    pub kyc: u8,
    pub refund: u8,
}

impl FactorScore {
    pub fn sum(&self) -> u16 {
        [
            self.chargeback,
            self.account_age,
            self.velocity,
            self.category,
            self.kyc,
            self.refund,
        ]
        .iter()
        .map(|score| u16::from(*score))
        .sum()
    }
}

/// Clamped total alongside the factors that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub total: u8,
    pub factors: FactorScore,
}

/// Stateless scorer bound to one immutable threshold set.
#[derive(Debug, Clone, Default)]
pub struct RiskEvaluator {
    thresholds: ScoringThresholds,
}

impl RiskEvaluator {
    pub fn new(thresholds: ScoringThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    pub fn score(&self, merchant: &MerchantSnapshot) -> ScoreCard {
        let factors = FactorScore {
            chargeback: ChargebackBand::classify(merchant.chargeback_rate, &self.thresholds)
                .points(),
            account_age: AccountAgeBand::classify(merchant.account_age_days).points(),
            velocity: VelocityBand::classify(merchant.velocity_multiplier, &self.thresholds)
                .points(),
            category: CategoryBand::classify(&merchant.industry).points(),
            kyc: KycStanding::classify(merchant.kyc_verified, &merchant.kyc_level).points(),
            refund: RefundBand::classify(merchant.refund_rate, &self.thresholds).points(),
        };

        let total = factors.sum().min(u16::from(MAX_RISK_SCORE)) as u8;

        ScoreCard { total, factors }
    }
}
