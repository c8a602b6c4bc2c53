use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::risk::domain::{HoldPeriod, MerchantId, RiskDecision, RiskLevel};

/// Scores strictly above this are flagged for review.
pub const HIGH_RISK_SCORE_THRESHOLD: u8 = 60;
/// Scores strictly above this need manual approval before any payout.
pub const IMMEDIATE_APPROVAL_SCORE_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ReserveBucket {
    #[serde(rename = "0_PERCENT")]
    None,
    #[serde(rename = "10_PERCENT")]
    Ten,
    #[serde(rename = "20_PERCENT")]
    Twenty,
}

impl ReserveBucket {
    pub fn for_percentage(percentage: u8) -> Self {
        match percentage {
            0 => ReserveBucket::None,
            1..=10 => ReserveBucket::Ten,
            _ => ReserveBucket::Twenty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendedAction {
    #[serde(rename = "Manual review required")]
    ManualReview,
    #[serde(rename = "Immediate manual approval required")]
    ImmediateManualApproval,
}

impl RecommendedAction {
    pub fn for_score(score: u8) -> Self {
        if score > IMMEDIATE_APPROVAL_SCORE_THRESHOLD {
            RecommendedAction::ImmediateManualApproval
        } else {
            RecommendedAction::ManualReview
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendedAction::ManualReview => "Manual review required",
            RecommendedAction::ImmediateManualApproval => "Immediate manual approval required",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighRiskMerchant {
    pub merchant_id: MerchantId,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub primary_concerns: Vec<String>,
    pub recommended_action: RecommendedAction,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchSummary {
    pub by_hold_period: BTreeMap<HoldPeriod, usize>,
    pub by_reserve: BTreeMap<ReserveBucket, usize>,
    pub by_risk_level: BTreeMap<RiskLevel, usize>,
    pub total_volume: Decimal,
    pub volume_by_tier: BTreeMap<RiskLevel, Decimal>,
}

/// Aggregate view over the successful decisions of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub evaluated_at: DateTime<Utc>,
    pub summary: BatchSummary,
    pub high_risk_merchants: Vec<HighRiskMerchant>,
}

impl BatchReport {
    /// Returns `None` when no decision succeeded. Merchants missing from `volumes` still count
    /// toward the tier tallies but are left out of the volume totals.
    pub fn build(
        decisions: &[RiskDecision],
        volumes: &HashMap<MerchantId, Decimal>,
    ) -> Option<Self> {
        let evaluated_at = decisions.iter().map(|decision| decision.evaluated_at).min()?;

        let mut summary = BatchSummary::default();
        let mut high_risk_merchants = Vec::new();

        for decision in decisions {
            *summary
                .by_hold_period
                .entry(decision.payout_hold_period)
                .or_default() += 1;
            *summary
                .by_reserve
                .entry(ReserveBucket::for_percentage(
                    decision.rolling_reserve_percentage,
                ))
                .or_default() += 1;
            *summary.by_risk_level.entry(decision.risk_level).or_default() += 1;

            if let Some(volume) = volumes.get(&decision.merchant_id) {
                summary.total_volume += *volume;
                *summary
                    .volume_by_tier
                    .entry(decision.risk_level)
                    .or_default() += *volume;
            }

            if decision.risk_score > HIGH_RISK_SCORE_THRESHOLD {
                high_risk_merchants.push(high_risk_entry(decision));
            }
        }

        Some(Self {
            evaluated_at,
            summary,
            high_risk_merchants,
        })
    }
}

fn high_risk_entry(decision: &RiskDecision) -> HighRiskMerchant {
    let primary_concerns = decision
        .reasoning
        .primary_factors
        .iter()
        .filter(|factor| factor.impact.is_concern())
        .map(|factor| factor.contribution.clone())
        .collect();

    HighRiskMerchant {
        merchant_id: decision.merchant_id,
        risk_score: decision.risk_score,
        risk_level: decision.risk_level,
        primary_concerns,
        recommended_action: RecommendedAction::for_score(decision.risk_score),
    }
}
