use super::domain::{MerchantId, MerchantSnapshot, RiskDecision};

/// Read access to merchant snapshots. Implementations must be safe to share across workers.
pub trait MerchantRepository: Send + Sync {
    fn get(&self, id: &MerchantId) -> Result<Option<MerchantSnapshot>, RepositoryError>;
}

/// Storage for persisted (non-simulated) decisions.
pub trait DecisionRepository: Send + Sync {
    fn create(&self, decision: RiskDecision) -> Result<RiskDecision, RepositoryError>;
    /// Latest non-simulation decision for the merchant, if any.
    fn get_latest_by_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Option<RiskDecision>, RepositoryError>;
    fn bulk_create(&self, decisions: Vec<RiskDecision>) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
