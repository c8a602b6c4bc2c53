use super::domain::{FactorExplanation, Impact, MerchantSnapshot, Reasoning};
use super::evaluation::rules::{
    AccountAgeBand, CategoryBand, ChargebackBand, KycStanding, RefundBand, VelocityBand,
};
use super::evaluation::{ScoreCard, ScoringThresholds};
use super::policy::PolicyTier;

/// Builds the audit narrative for a scored merchant.
///
/// Impact bands come from the same thresholds that produced the score, so a simulation run with
/// overridden cut points is described in terms of those cut points.
pub fn explain(
    merchant: &MerchantSnapshot,
    card: &ScoreCard,
    tier: &PolicyTier,
    thresholds: &ScoringThresholds,
) -> Reasoning {
    let factors = &card.factors;
    let primary_factors = vec![
        chargeback(factors.chargeback, merchant.chargeback_rate, thresholds),
        account_age(factors.account_age, merchant.account_age_days),
        velocity(factors.velocity, merchant.velocity_multiplier, thresholds),
        category(factors.category, merchant),
        kyc(factors.kyc, merchant),
        refund(factors.refund, merchant.refund_rate, thresholds),
    ];

    let policy_explanation = format!(
        "Score of {} places merchant in {} tier requiring {} hold and {}% reserve",
        card.total, tier.risk_level, tier.hold_period, tier.reserve_percentage
    );

    Reasoning {
        primary_factors,
        policy_explanation,
    }
}

fn factor(name: &str, score: u8, contribution: String, impact: Impact) -> FactorExplanation {
    FactorExplanation {
        factor: name.to_string(),
        score,
        contribution,
        impact,
    }
}

fn chargeback(score: u8, rate: f64, thresholds: &ScoringThresholds) -> FactorExplanation {
    let (verdict, impact) = match ChargebackBand::classify(rate, thresholds) {
        ChargebackBand::Excellent => ("Excellent", Impact::Positive),
        ChargebackBand::Acceptable => ("Acceptable range", Impact::Neutral),
        ChargebackBand::Concerning => ("Concerning", Impact::Negative),
        ChargebackBand::Critical => ("Critical", Impact::Critical),
    };

    factor(
        "Chargeback Rate",
        score,
        format!("{rate:.2}% rate - {verdict}"),
        impact,
    )
}

fn account_age(score: u8, days: u32) -> FactorExplanation {
    let (verdict, impact) = match AccountAgeBand::classify(days) {
        AccountAgeBand::VeryNew => ("Very new", Impact::Critical),
        AccountAgeBand::New => ("New", Impact::Negative),
        AccountAgeBand::EarlyStage => ("Early stage", Impact::Neutral),
        AccountAgeBand::Established => ("Established", Impact::Neutral),
        AccountAgeBand::Mature => ("Mature", Impact::Positive),
        AccountAgeBand::Veteran => ("Veteran", Impact::Positive),
    };

    factor(
        "Account Age",
        score,
        format!("Account {days} days old - {verdict}"),
        impact,
    )
}

fn velocity(score: u8, multiplier: f64, thresholds: &ScoringThresholds) -> FactorExplanation {
    let (verdict, impact) = match VelocityBand::classify(multiplier, thresholds) {
        VelocityBand::Normal => ("Normal", Impact::Positive),
        VelocityBand::Elevated => ("Elevated", Impact::Neutral),
        VelocityBand::Concerning => ("Concerning", Impact::Negative),
        VelocityBand::HighRisk => ("High risk", Impact::Negative),
        VelocityBand::Critical => ("Critical", Impact::Critical),
    };

    factor(
        "Transaction Velocity",
        score,
        format!("{multiplier:.1}x velocity - {verdict}"),
        impact,
    )
}

fn category(score: u8, merchant: &MerchantSnapshot) -> FactorExplanation {
    let (verdict, impact) = match CategoryBand::classify(&merchant.industry) {
        CategoryBand::High => ("High risk category", Impact::Negative),
        // Unknown categories score as medium and read the same way.
        CategoryBand::Medium | CategoryBand::Unrecognized => {
            ("Medium risk category", Impact::Neutral)
        }
        CategoryBand::Low => ("Low risk category", Impact::Positive),
        CategoryBand::Minimal => ("Minimal risk category", Impact::Positive),
    };

    factor(
        "Business Category",
        score,
        format!("{} - {verdict}", merchant.industry),
        impact,
    )
}

fn kyc(score: u8, merchant: &MerchantSnapshot) -> FactorExplanation {
    let (contribution, impact) =
        match KycStanding::classify(merchant.kyc_verified, &merchant.kyc_level) {
            KycStanding::Unverified => ("No KYC verification", Impact::Critical),
            KycStanding::Partial => ("Partial KYC - ID only", Impact::Negative),
            KycStanding::Full => ("Full KYC - ID and address verified", Impact::Neutral),
            KycStanding::Enhanced => (
                "Enhanced KYC - Full business documentation",
                Impact::Positive,
            ),
        };

    factor("KYC Verification", score, contribution.to_string(), impact)
}

fn refund(score: u8, rate: f64, thresholds: &ScoringThresholds) -> FactorExplanation {
    let (verdict, impact) = match RefundBand::classify(rate, thresholds) {
        RefundBand::Normal => ("Normal", Impact::Positive),
        RefundBand::Elevated => ("Elevated", Impact::Neutral),
        RefundBand::High => ("High (fraud signal)", Impact::Negative),
    };

    factor(
        "Refund Rate",
        score,
        format!("{rate:.1}% refund rate - {verdict}"),
        impact,
    )
}
