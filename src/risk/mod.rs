//! Merchant risk scoring: factor evaluation, policy tiers, explanations, persistence-backed
//! decisions and bounded concurrent batch runs.

pub mod batch;
pub mod domain;
pub mod evaluation;
pub mod explainer;
pub mod fixtures;
pub mod overrides;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

pub use batch::{
    BatchError, BatchEvaluator, BatchFailure, BatchReport, BatchResult, BatchResultView,
    BatchSettings, BatchSummary, HighRiskMerchant, RecommendedAction, ReserveBucket,
};
pub use domain::{
    BatchId, DecisionId, FactorExplanation, HoldPeriod, Impact, KycLevel, MerchantCategory,
    MerchantId, MerchantProfile, MerchantSnapshot, PolicyInfo, Reasoning, RiskDecision,
    RiskLevel, RiskMetrics,
};
pub use evaluation::{FactorScore, RiskEvaluator, ScoreCard, ScoringThresholds, MAX_RISK_SCORE};
pub use explainer::explain;
pub use fixtures::{MerchantFixtureError, MerchantFixtureImporter};
pub use overrides::{SimulationOverrides, ThresholdOverrides};
pub use policy::{PolicyMapper, PolicyTier};
pub use repository::{DecisionRepository, MerchantRepository, RepositoryError};
pub use router::{risk_router, RiskApi};
pub use service::{RiskDecisionService, RiskServiceError};

#[cfg(test)]
mod tests;
