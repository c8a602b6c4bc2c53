use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for merchants held by the merchant store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantId(pub Uuid);

impl MerchantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

impl Default for MerchantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier shared by every decision produced during one batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionId(pub Uuid);

impl DecisionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Industry the merchant operates in. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MerchantCategory {
    DigitalGoods,
    Travel,
    Electronics,
    Fashion,
    Services,
    FoodDelivery,
    Retail,
    Utilities,
    Healthcare,
    Other(String),
}

impl MerchantCategory {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DIGITAL_GOODS" => Self::DigitalGoods,
            "TRAVEL" => Self::Travel,
            "ELECTRONICS" => Self::Electronics,
            "FASHION" => Self::Fashion,
            "SERVICES" => Self::Services,
            "FOOD_DELIVERY" => Self::FoodDelivery,
            "RETAIL" => Self::Retail,
            "UTILITIES" => Self::Utilities,
            "HEALTHCARE" => Self::Healthcare,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DigitalGoods => "DIGITAL_GOODS",
            Self::Travel => "TRAVEL",
            Self::Electronics => "ELECTRONICS",
            Self::Fashion => "FASHION",
            Self::Services => "SERVICES",
            Self::FoodDelivery => "FOOD_DELIVERY",
            Self::Retail => "RETAIL",
            Self::Utilities => "UTILITIES",
            Self::Healthcare => "HEALTHCARE",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for MerchantCategory {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<MerchantCategory> for String {
    fn from(value: MerchantCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for MerchantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Depth of identity verification on file for the merchant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KycLevel {
    None,
    Partial,
    Full,
    Enhanced,
    Unrecognized(String),
}

impl KycLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NONE" | "" => Self::None,
            "PARTIAL" => Self::Partial,
            "FULL" => Self::Full,
            "ENHANCED" => Self::Enhanced,
            _ => Self::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "NONE",
            Self::Partial => "PARTIAL",
            Self::Full => "FULL",
            Self::Enhanced => "ENHANCED",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for KycLevel {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<KycLevel> for String {
    fn from(value: KycLevel) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for KycLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only copy of a merchant record as supplied by the merchant store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantSnapshot {
    pub id: MerchantId,
    pub merchant_name: String,
    pub industry: MerchantCategory,
    pub country: String,
    pub transaction_volume_30d: Decimal,
    pub transaction_count_30d: u32,
    pub avg_ticket_size: Decimal,
    pub chargeback_count_30d: u32,
    /// Percentage, e.g. `0.75` for 0.75%.
    pub chargeback_rate: f64,
    /// Percentage.
    pub refund_rate: f64,
    pub velocity_multiplier: f64,
    pub account_age_days: u32,
    pub account_created_at: DateTime<Utc>,
    pub kyc_verified: bool,
    pub kyc_level: KycLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    MediumLow,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::MediumLow => "MEDIUM_LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delay applied before payouts are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HoldPeriod {
    #[serde(rename = "IMMEDIATE")]
    Immediate,
    #[serde(rename = "7_DAYS")]
    SevenDays,
    #[serde(rename = "14_DAYS")]
    FourteenDays,
    #[serde(rename = "45_DAYS")]
    FortyFiveDays,
}

impl HoldPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            HoldPeriod::Immediate => "IMMEDIATE",
            HoldPeriod::SevenDays => "7_DAYS",
            HoldPeriod::FourteenDays => "14_DAYS",
            HoldPeriod::FortyFiveDays => "45_DAYS",
        }
    }
}

impl fmt::Display for HoldPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a single factor moved the merchant's risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
    Critical,
}

impl Impact {
    pub fn is_concern(&self) -> bool {
        matches!(self, Impact::Negative | Impact::Critical)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorExplanation {
    pub factor: String,
    pub score: u8,
    pub contribution: String,
    pub impact: Impact,
}

/// Ordered factor explanations plus the policy sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub primary_factors: Vec<FactorExplanation>,
    pub policy_explanation: String,
}

/// Outcome of one merchant evaluation. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDecision {
    #[serde(rename = "decision_id")]
    pub id: DecisionId,
    pub merchant_id: MerchantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub payout_hold_period: HoldPeriod,
    pub rolling_reserve_percentage: u8,
    pub reasoning: Reasoning,
    pub evaluated_at: DateTime<Utc>,
    pub simulation: bool,
}

/// Read view joining the merchant snapshot with its latest persisted decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantProfile {
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    pub industry: MerchantCategory,
    pub country: String,
    pub account_created_at: DateTime<Utc>,
    pub account_age_days: u32,
    pub risk_metrics: RiskMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_policy: Option<PolicyInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub transaction_volume_30d: Decimal,
    pub transaction_count_30d: u32,
    pub avg_ticket_size: Decimal,
    pub chargeback_count_30d: u32,
    pub chargeback_rate: f64,
    pub refund_rate: f64,
    pub velocity_multiplier: f64,
    pub kyc_verified: bool,
    pub kyc_level: KycLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyInfo {
    pub risk_score: u8,
    pub payout_hold_period: HoldPeriod,
    pub rolling_reserve_percentage: u8,
    pub last_evaluated_at: DateTime<Utc>,
}

impl MerchantProfile {
    pub fn from_parts(merchant: &MerchantSnapshot, latest: Option<&RiskDecision>) -> Self {
        Self {
            merchant_id: merchant.id,
            merchant_name: merchant.merchant_name.clone(),
            industry: merchant.industry.clone(),
            country: merchant.country.clone(),
            account_created_at: merchant.account_created_at,
            account_age_days: merchant.account_age_days,
            risk_metrics: RiskMetrics {
                transaction_volume_30d: merchant.transaction_volume_30d,
                transaction_count_30d: merchant.transaction_count_30d,
                avg_ticket_size: merchant.avg_ticket_size,
                chargeback_count_30d: merchant.chargeback_count_30d,
                chargeback_rate: merchant.chargeback_rate,
                refund_rate: merchant.refund_rate,
                velocity_multiplier: merchant.velocity_multiplier,
                kyc_verified: merchant.kyc_verified,
                kyc_level: merchant.kyc_level.clone(),
            },
            current_policy: latest.map(|decision| PolicyInfo {
                risk_score: decision.risk_score,
                payout_hold_period: decision.payout_hold_period,
                rolling_reserve_percentage: decision.rolling_reserve_percentage,
                last_evaluated_at: decision.evaluated_at,
            }),
        }
    }
}
