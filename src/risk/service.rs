use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    BatchId, DecisionId, MerchantId, MerchantProfile, MerchantSnapshot, RiskDecision,
};
use super::evaluation::{RiskEvaluator, ScoringThresholds};
use super::explainer::explain;
use super::overrides::SimulationOverrides;
use super::policy::PolicyMapper;
use super::repository::{DecisionRepository, MerchantRepository, RepositoryError};

/// Scores at or above this level are logged as warnings.
const HIGH_RISK_LOG_THRESHOLD: u8 = 60;

/// Service composing the evaluator, policy table, explainer, and the injected stores.
pub struct RiskDecisionService<M, D> {
    merchants: Arc<M>,
    decisions: Arc<D>,
    evaluator: Arc<RiskEvaluator>,
    policy: Arc<PolicyMapper>,
}

impl<M, D> RiskDecisionService<M, D>
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    pub fn new(merchants: Arc<M>, decisions: Arc<D>, thresholds: ScoringThresholds) -> Self {
        Self {
            merchants,
            decisions,
            evaluator: Arc::new(RiskEvaluator::new(thresholds)),
            policy: Arc::new(PolicyMapper::standard()),
        }
    }

    pub fn merchants(&self) -> &Arc<M> {
        &self.merchants
    }

    /// Score a merchant. Persists the decision unless `simulate` is set.
    pub fn evaluate(
        &self,
        merchant_id: &MerchantId,
        simulate: bool,
    ) -> Result<RiskDecision, RiskServiceError> {
        self.evaluate_for_batch(merchant_id, simulate, None)
    }

    pub(crate) fn evaluate_for_batch(
        &self,
        merchant_id: &MerchantId,
        simulate: bool,
        batch_id: Option<BatchId>,
    ) -> Result<RiskDecision, RiskServiceError> {
        info!(%merchant_id, simulate, "evaluating merchant");

        let merchant = self.load_merchant(merchant_id)?;
        let decision = self.decide(&merchant, &self.evaluator, simulate, batch_id);

        if decision.risk_score >= HIGH_RISK_LOG_THRESHOLD {
            warn!(
                %merchant_id,
                score = decision.risk_score,
                level = %decision.risk_level,
                "high risk score detected"
            );
        } else {
            info!(
                %merchant_id,
                score = decision.risk_score,
                level = %decision.risk_level,
                hold = %decision.payout_hold_period,
                "merchant evaluated"
            );
        }

        if simulate {
            return Ok(decision);
        }

        let stored = self
            .decisions
            .create(decision)
            .map_err(|source| RiskServiceError::DecisionWrite {
                merchant_id: *merchant_id,
                source,
            })?;
        debug!(%merchant_id, "decision saved");
        Ok(stored)
    }

    /// What-if evaluation over a local copy of the merchant. Never persisted.
    pub fn simulate(
        &self,
        merchant_id: &MerchantId,
        overrides: &SimulationOverrides,
    ) -> Result<RiskDecision, RiskServiceError> {
        info!(%merchant_id, empty = overrides.is_empty(), "simulating merchant");

        let mut merchant = self.load_merchant(merchant_id)?;
        overrides.apply_to(&mut merchant);

        let custom;
        let evaluator = match &overrides.scoring_thresholds {
            Some(thresholds) => {
                debug!(%merchant_id, "using custom scoring thresholds");
                custom = RiskEvaluator::new(self.evaluator.thresholds().with_overrides(thresholds));
                &custom
            }
            None => self.evaluator.as_ref(),
        };

        let decision = self.decide(&merchant, evaluator, true, None);
        info!(%merchant_id, score = decision.risk_score, "simulation complete");
        Ok(decision)
    }

    /// Merchant snapshot joined with its most recent persisted decision.
    pub fn profile(&self, merchant_id: &MerchantId) -> Result<MerchantProfile, RiskServiceError> {
        let merchant = self.load_merchant(merchant_id)?;
        let latest = self
            .decisions
            .get_latest_by_merchant(merchant_id)
            .map_err(|source| RiskServiceError::DecisionLookup {
                merchant_id: *merchant_id,
                source,
            })?;

        Ok(MerchantProfile::from_parts(&merchant, latest.as_ref()))
    }

    fn load_merchant(&self, merchant_id: &MerchantId) -> Result<MerchantSnapshot, RiskServiceError> {
        match self.merchants.get(merchant_id) {
            Ok(Some(merchant)) => Ok(merchant),
            Ok(None) | Err(RepositoryError::NotFound) => {
                Err(RiskServiceError::MerchantNotFound(*merchant_id))
            }
            Err(source) => Err(RiskServiceError::MerchantLookup {
                merchant_id: *merchant_id,
                source,
            }),
        }
    }

    fn decide(
        &self,
        merchant: &MerchantSnapshot,
        evaluator: &RiskEvaluator,
        simulate: bool,
        batch_id: Option<BatchId>,
    ) -> RiskDecision {
        let card = evaluator.score(merchant);
        let tier = self.policy.tier_for(card.total);
        let reasoning = explain(merchant, &card, tier, evaluator.thresholds());

        RiskDecision {
            id: DecisionId::new(),
            merchant_id: merchant.id,
            batch_id,
            risk_score: card.total,
            risk_level: tier.risk_level,
            payout_hold_period: tier.hold_period,
            rolling_reserve_percentage: tier.reserve_percentage,
            reasoning,
            evaluated_at: Utc::now(),
            simulation: simulate,
        }
    }
}

/// Error raised by the decision service.
#[derive(Debug, thiserror::Error)]
pub enum RiskServiceError {
    #[error("merchant {0} not found")]
    MerchantNotFound(MerchantId),
    #[error("failed to get merchant {merchant_id}: {source}")]
    MerchantLookup {
        merchant_id: MerchantId,
        #[source]
        source: RepositoryError,
    },
    #[error("failed to save decision for merchant {merchant_id}: {source}")]
    DecisionWrite {
        merchant_id: MerchantId,
        #[source]
        source: RepositoryError,
    },
    #[error("failed to get latest decision for merchant {merchant_id}: {source}")]
    DecisionLookup {
        merchant_id: MerchantId,
        #[source]
        source: RepositoryError,
    },
}
