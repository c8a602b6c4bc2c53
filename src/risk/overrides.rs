//! What-if inputs accepted by simulations.
//!
//! Every field is optional. Values of the wrong JSON type deserialize to `None`, so a payload such
//! as `{"chargeback_rate": "high"}` leaves the chargeback rate unchanged instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::domain::{KycLevel, MerchantSnapshot};

/// Attribute and threshold overrides applied to a local merchant copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOverrides {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub chargeback_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_days")]
    pub account_age_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub kyc_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub velocity_multiplier: Option<f64>,
    #[serde(default, deserialize_with = "lenient_thresholds")]
    pub scoring_thresholds: Option<ThresholdOverrides>,
}

impl SimulationOverrides {
    pub fn apply_to(&self, merchant: &mut MerchantSnapshot) {
        if let Some(rate) = self.chargeback_rate {
            merchant.chargeback_rate = rate;
        }
        if let Some(days) = self.account_age_days {
            merchant.account_age_days = days;
        }
        if let Some(verified) = self.kyc_verified {
            merchant.kyc_verified = verified;
            if verified && merchant.kyc_level == KycLevel::None {
                merchant.kyc_level = KycLevel::Full;
            }
        }
        if let Some(multiplier) = self.velocity_multiplier {
            merchant.velocity_multiplier = multiplier;
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Subset of scoring thresholds a simulation may replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub chargeback_excellent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub chargeback_acceptable: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub chargeback_critical: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub velocity_normal: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub refund_normal: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub refund_elevated: Option<f64>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|number| number.is_finite()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_bool))
}

fn lenient_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let days = lenient_f64(deserializer)?;
    Ok(days
        .filter(|days| *days >= 0.0)
        .map(|days| days.min(f64::from(u32::MAX)) as u32))
}

fn lenient_thresholds<'de, D>(deserializer: D) -> Result<Option<ThresholdOverrides>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(Value::is_object)
        .and_then(|object| serde_json::from_value(object).ok()))
}
