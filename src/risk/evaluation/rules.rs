use super::config::{
    ScoringThresholds, ACCOUNT_AGE_EARLY, ACCOUNT_AGE_ESTABLISHED, ACCOUNT_AGE_MATURE,
    ACCOUNT_AGE_NEW, ACCOUNT_AGE_VERY_NEW,
};
use crate::risk::domain::{KycLevel, MerchantCategory};

// Shared by the scorer and the explainer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChargebackBand {
    Excellent,
    Acceptable,
    Concerning,
    Critical,
}

impl ChargebackBand {
    pub(crate) fn classify(rate: f64, thresholds: &ScoringThresholds) -> Self {
        if rate < thresholds.chargeback_excellent {
            Self::Excellent
        } else if rate < thresholds.chargeback_acceptable {
            Self::Acceptable
        } else if rate < thresholds.chargeback_critical {
            Self::Concerning
        } else {
            Self::Critical
        }
    }

    pub(crate) fn points(self) -> u8 {
        match self {
            Self::Excellent => 0,
            Self::Acceptable => 10,
            Self::Concerning => 20,
            Self::Critical => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccountAgeBand {
    VeryNew,
    New,
    EarlyStage,
    Established,
    Mature,
    Veteran,
}

impl AccountAgeBand {
    pub(crate) fn classify(days: u32) -> Self {
        if days < ACCOUNT_AGE_VERY_NEW {
            Self::VeryNew
        } else if days < ACCOUNT_AGE_NEW {
            Self::New
        } else if days < ACCOUNT_AGE_EARLY {
            Self::EarlyStage
        } else if days < ACCOUNT_AGE_ESTABLISHED {
            Self::Established
        } else if days < ACCOUNT_AGE_MATURE {
            Self::Mature
        } else {
            Self::Veteran
        }
    }

    pub(crate) fn points(self) -> u8 {
        match self {
            Self::VeryNew => 25,
            Self::New => 20,
            Self::EarlyStage => 15,
            Self::Established => 10,
            Self::Mature => 5,
            Self::Veteran => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VelocityBand {
    Normal,
    Elevated,
    Concerning,
    HighRisk,
    Critical,
}

impl VelocityBand {
    pub(crate) fn classify(multiplier: f64, thresholds: &ScoringThresholds) -> Self {
        if multiplier < thresholds.velocity_normal {
            Self::Normal
        } else if multiplier < thresholds.velocity_elevated {
            Self::Elevated
        } else if multiplier < thresholds.velocity_concerning {
            Self::Concerning
        } else if multiplier < thresholds.velocity_high_risk {
            Self::HighRisk
        } else {
            Self::Critical
        }
    }

    pub(crate) fn points(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Elevated => 5,
            Self::Concerning => 10,
            Self::HighRisk => 15,
            Self::Critical => 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefundBand {
    Normal,
    Elevated,
    High,
}

impl RefundBand {
    pub(crate) fn classify(rate: f64, thresholds: &ScoringThresholds) -> Self {
        if rate < thresholds.refund_normal {
            Self::Normal
        } else if rate < thresholds.refund_elevated {
            Self::Elevated
        } else {
            Self::High
        }
    }

    pub(crate) fn points(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Elevated => 3,
            Self::High => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CategoryBand {
    High,
    Medium,
    Low,
    Minimal,
    Unrecognized,
}

impl CategoryBand {
    pub(crate) fn classify(category: &MerchantCategory) -> Self {
        match category {
            MerchantCategory::DigitalGoods
            | MerchantCategory::Travel
            | MerchantCategory::Electronics => Self::High,
            MerchantCategory::Fashion | MerchantCategory::Services => Self::Medium,
            MerchantCategory::FoodDelivery | MerchantCategory::Retail => Self::Low,
            MerchantCategory::Utilities | MerchantCategory::Healthcare => Self::Minimal,
            MerchantCategory::Other(_) => Self::Unrecognized,
        }
    }

    pub(crate) fn points(self) -> u8 {
        match self {
            Self::High => 15,
            Self::Medium | Self::Unrecognized => 10,
            Self::Low => 5,
            Self::Minimal => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KycStanding {
    Unverified,
    Partial,
    Full,
    Enhanced,
}

impl KycStanding {
    /// A verified merchant without a recognised level is treated as unverified.
    pub(crate) fn classify(verified: bool, level: &KycLevel) -> Self {
        if !verified {
            return Self::Unverified;
        }

        match level {
            KycLevel::Partial => Self::Partial,
            KycLevel::Full => Self::Full,
            KycLevel::Enhanced => Self::Enhanced,
            KycLevel::None | KycLevel::Unrecognized(_) => Self::Unverified,
        }
    }

    pub(crate) fn points(self) -> u8 {
        match self {
            Self::Unverified => 10,
            Self::Partial => 7,
            Self::Full => 3,
            Self::Enhanced => 0,
        }
    }
}
