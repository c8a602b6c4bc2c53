use metrics_exporter_prometheus::PrometheusHandle;
use payout_risk::risk::{
    DecisionRepository, MerchantId, MerchantRepository, MerchantSnapshot, RepositoryError,
    RiskDecision,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Merchant store seeded from fixtures at start-up.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMerchantRepository {
    records: Arc<Mutex<HashMap<MerchantId, MerchantSnapshot>>>,
}

impl InMemoryMerchantRepository {
    pub(crate) fn seed(&self, merchants: Vec<MerchantSnapshot>) -> usize {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        for merchant in merchants {
            guard.insert(merchant.id, merchant);
        }
        guard.len()
    }

    /// Identifiers in a stable order so batch runs are reproducible.
    pub(crate) fn ids(&self) -> Vec<MerchantId> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut ids: Vec<MerchantId> = guard.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl MerchantRepository for InMemoryMerchantRepository {
    fn get(&self, id: &MerchantId) -> Result<Option<MerchantSnapshot>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDecisionRepository {
    records: Arc<Mutex<Vec<RiskDecision>>>,
}

impl InMemoryDecisionRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl DecisionRepository for InMemoryDecisionRepository {
    fn create(&self, decision: RiskDecision) -> Result<RiskDecision, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == decision.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(decision.clone());
        Ok(decision)
    }

    fn get_latest_by_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Option<RiskDecision>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|decision| decision.merchant_id == *merchant_id && !decision.simulation)
            .max_by_key(|decision| decision.evaluated_at)
            .cloned())
    }

    fn bulk_create(&self, decisions: Vec<RiskDecision>) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if decisions
            .iter()
            .any(|decision| guard.iter().any(|existing| existing.id == decision.id))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.extend(decisions);
        Ok(())
    }
}
