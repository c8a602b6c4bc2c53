use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::risk::domain::{
    KycLevel, MerchantCategory, MerchantId, MerchantSnapshot, RiskDecision,
};
use crate::risk::repository::{DecisionRepository, MerchantRepository, RepositoryError};
use crate::risk::{
    risk_router, BatchSettings, RiskApi, RiskDecisionService, ScoringThresholds,
};

/// cb=0.3, age=800, v=1.2, RETAIL, verified ENHANCED, refund=2.0. Scores 5.
pub(super) fn trusted_merchant() -> MerchantSnapshot {
    MerchantSnapshot {
        id: MerchantId::new(),
        merchant_name: "Corner Grocer".to_string(),
        industry: MerchantCategory::Retail,
        country: "US".to_string(),
        transaction_volume_30d: Decimal::new(125_000_00, 2),
        transaction_count_30d: 2_500,
        avg_ticket_size: Decimal::new(50_00, 2),
        chargeback_count_30d: 7,
        chargeback_rate: 0.3,
        refund_rate: 2.0,
        velocity_multiplier: 1.2,
        account_age_days: 800,
        account_created_at: Utc.with_ymd_and_hms(2023, 8, 1, 0, 0, 0).unwrap(),
        kyc_verified: true,
        kyc_level: KycLevel::Enhanced,
    }
}

/// cb=4.5, age=15, v=8.0, DIGITAL_GOODS, unverified NONE, refund=8.5. Scores 100.
pub(super) fn critical_merchant() -> MerchantSnapshot {
    MerchantSnapshot {
        id: MerchantId::new(),
        merchant_name: "Instant Keys".to_string(),
        industry: MerchantCategory::DigitalGoods,
        country: "NL".to_string(),
        transaction_volume_30d: Decimal::new(80_000_00, 2),
        transaction_count_30d: 4_000,
        avg_ticket_size: Decimal::new(20_00, 2),
        chargeback_count_30d: 180,
        chargeback_rate: 4.5,
        refund_rate: 8.5,
        velocity_multiplier: 8.0,
        account_age_days: 15,
        account_created_at: Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        kyc_verified: false,
        kyc_level: KycLevel::None,
    }
}

/// Lands in the HIGH tier: 20 + 20 + 10 + 10 + 7 + 3 = 70.
pub(super) fn high_risk_merchant() -> MerchantSnapshot {
    MerchantSnapshot {
        id: MerchantId::new(),
        merchant_name: "Weekend Getaways".to_string(),
        industry: MerchantCategory::Services,
        country: "ES".to_string(),
        transaction_volume_30d: Decimal::new(40_000_00, 2),
        transaction_count_30d: 400,
        avg_ticket_size: Decimal::new(100_00, 2),
        chargeback_count_30d: 5,
        chargeback_rate: 1.2,
        refund_rate: 4.0,
        velocity_multiplier: 3.0,
        account_age_days: 60,
        account_created_at: Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap(),
        kyc_verified: true,
        kyc_level: KycLevel::Partial,
    }
}

pub(super) fn unverified_merchant() -> MerchantSnapshot {
    MerchantSnapshot {
        kyc_verified: false,
        kyc_level: KycLevel::None,
        ..trusted_merchant()
    }
}

pub(super) fn build_service(
    merchants: Vec<MerchantSnapshot>,
) -> (
    RiskDecisionService<MemoryMerchants, MemoryDecisions>,
    Arc<MemoryMerchants>,
    Arc<MemoryDecisions>,
) {
    let merchant_repo = Arc::new(MemoryMerchants::with(merchants));
    let decision_repo = Arc::new(MemoryDecisions::default());
    let service = RiskDecisionService::new(
        merchant_repo.clone(),
        decision_repo.clone(),
        ScoringThresholds::default(),
    );
    (service, merchant_repo, decision_repo)
}

pub(super) fn settings(workers: usize, deadline: Duration) -> BatchSettings {
    BatchSettings {
        max_batch_size: 100,
        workers,
        deadline,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMerchants {
    records: Arc<Mutex<HashMap<MerchantId, MerchantSnapshot>>>,
}

impl MemoryMerchants {
    pub(super) fn with(merchants: Vec<MerchantSnapshot>) -> Self {
        let repo = Self::default();
        {
            let mut guard = repo.records.lock().expect("merchant mutex poisoned");
            for merchant in merchants {
                guard.insert(merchant.id, merchant);
            }
        }
        repo
    }

    pub(super) fn stored(&self, id: &MerchantId) -> Option<MerchantSnapshot> {
        self.records
            .lock()
            .expect("merchant mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl MerchantRepository for MemoryMerchants {
    fn get(&self, id: &MerchantId) -> Result<Option<MerchantSnapshot>, RepositoryError> {
        let guard = self.records.lock().expect("merchant mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDecisions {
    records: Arc<Mutex<Vec<RiskDecision>>>,
    creates: Arc<AtomicUsize>,
}

impl MemoryDecisions {
    pub(super) fn decisions(&self) -> Vec<RiskDecision> {
        self.records.lock().expect("decision mutex poisoned").clone()
    }

    pub(super) fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

impl DecisionRepository for MemoryDecisions {
    fn create(&self, decision: RiskDecision) -> Result<RiskDecision, RepositoryError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.records.lock().expect("decision mutex poisoned");
        guard.push(decision.clone());
        Ok(decision)
    }

    fn get_latest_by_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Option<RiskDecision>, RepositoryError> {
        let guard = self.records.lock().expect("decision mutex poisoned");
        Ok(guard
            .iter()
            .filter(|decision| decision.merchant_id == *merchant_id && !decision.simulation)
            .max_by_key(|decision| decision.evaluated_at)
            .cloned())
    }

    fn bulk_create(&self, decisions: Vec<RiskDecision>) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("decision mutex poisoned");
        guard.extend(decisions);
        Ok(())
    }
}

pub(super) struct UnavailableMerchants;

impl MerchantRepository for UnavailableMerchants {
    fn get(&self, _id: &MerchantId) -> Result<Option<MerchantSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("merchant store offline".to_string()))
    }
}

pub(super) struct UnavailableDecisions;

impl DecisionRepository for UnavailableDecisions {
    fn create(&self, _decision: RiskDecision) -> Result<RiskDecision, RepositoryError> {
        Err(RepositoryError::Unavailable("decision store offline".to_string()))
    }

    fn get_latest_by_merchant(
        &self,
        _merchant_id: &MerchantId,
    ) -> Result<Option<RiskDecision>, RepositoryError> {
        Err(RepositoryError::Unavailable("decision store offline".to_string()))
    }

    fn bulk_create(&self, _decisions: Vec<RiskDecision>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("decision store offline".to_string()))
    }
}

/// Merchant store that sleeps on every read and records the peak number of concurrent reads.
pub(super) struct SlowMerchants {
    inner: MemoryMerchants,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowMerchants {
    pub(super) fn new(merchants: Vec<MerchantSnapshot>, delay: Duration) -> Self {
        Self {
            inner: MemoryMerchants::with(merchants),
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub(super) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl MerchantRepository for SlowMerchants {
    fn get(&self, id: &MerchantId) -> Result<Option<MerchantSnapshot>, RepositoryError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.get(id)
    }
}

/// Merchant store that serves the first read of `flaky` and fails every read after it.
pub(super) struct FlakyMerchants {
    inner: MemoryMerchants,
    flaky: MerchantId,
    reads: Mutex<usize>,
}

impl FlakyMerchants {
    pub(super) fn new(merchants: Vec<MerchantSnapshot>, flaky: MerchantId) -> Self {
        Self {
            inner: MemoryMerchants::with(merchants),
            flaky,
            reads: Mutex::new(0),
        }
    }
}

impl MerchantRepository for FlakyMerchants {
    fn get(&self, id: &MerchantId) -> Result<Option<MerchantSnapshot>, RepositoryError> {
        if *id == self.flaky {
            let mut reads = self.reads.lock().expect("read counter poisoned");
            *reads += 1;
            if *reads > 1 {
                return Err(RepositoryError::Unavailable("replica lagging".to_string()));
            }
        }
        self.inner.get(id)
    }
}

pub(super) fn risk_router_with_service(
    service: RiskDecisionService<MemoryMerchants, MemoryDecisions>,
) -> axum::Router {
    let api = RiskApi::new(Arc::new(service), BatchSettings::default());
    risk_router(Arc::new(api))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
