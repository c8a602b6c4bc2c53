use serde::{Deserialize, Serialize};

use crate::risk::overrides::ThresholdOverrides;

/// Account age cut points in days. Not overridable.
pub(crate) const ACCOUNT_AGE_VERY_NEW: u32 = 30;
pub(crate) const ACCOUNT_AGE_NEW: u32 = 91;
pub(crate) const ACCOUNT_AGE_EARLY: u32 = 181;
pub(crate) const ACCOUNT_AGE_ESTABLISHED: u32 = 366;
pub(crate) const ACCOUNT_AGE_MATURE: u32 = 731;

/// Cut points for the rate-based factors. Lower bounds are inclusive, upper bounds exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringThresholds {
    pub chargeback_excellent: f64,
    pub chargeback_acceptable: f64,
    pub chargeback_critical: f64,
    pub velocity_normal: f64,
    pub velocity_elevated: f64,
    pub velocity_concerning: f64,
    pub velocity_high_risk: f64,
    pub refund_normal: f64,
    pub refund_elevated: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            chargeback_excellent: 0.5,
            chargeback_acceptable: 1.0,
            chargeback_critical: 1.5,
            velocity_normal: 1.5,
            velocity_elevated: 2.5,
            velocity_concerning: 4.0,
            velocity_high_risk: 6.0,
            refund_normal: 3.0,
            refund_elevated: 6.0,
        }
    }
}

impl ScoringThresholds {
    /// Returns a copy with the supplied overrides applied; `self` is left untouched.
    pub fn with_overrides(&self, overrides: &ThresholdOverrides) -> Self {
        Self {
            chargeback_excellent: overrides
                .chargeback_excellent
                .unwrap_or(self.chargeback_excellent),
            chargeback_acceptable: overrides
                .chargeback_acceptable
                .unwrap_or(self.chargeback_acceptable),
            chargeback_critical: overrides
                .chargeback_critical
                .unwrap_or(self.chargeback_critical),
            velocity_normal: overrides.velocity_normal.unwrap_or(self.velocity_normal),
            refund_normal: overrides.refund_normal.unwrap_or(self.refund_normal),
            refund_elevated: overrides.refund_elevated.unwrap_or(self.refund_elevated),
            ..self.clone()
        }
    }
}
