mod report;

pub use report::{
    BatchReport, BatchSummary, HighRiskMerchant, RecommendedAction, ReserveBucket,
    HIGH_RISK_SCORE_THRESHOLD, IMMEDIATE_APPROVAL_SCORE_THRESHOLD,
};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::domain::{BatchId, MerchantId, RiskDecision};
use super::repository::{DecisionRepository, MerchantRepository};
use super::service::RiskDecisionService;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;
pub const DEFAULT_BATCH_WORKERS: usize = 10;
pub const DEFAULT_BATCH_DEADLINE: Duration = Duration::from_secs(30);

const INVALID_IDENTIFIER: &str = "invalid merchant identifier format";

/// Limits applied to a single batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub max_batch_size: usize,
    pub workers: usize,
    pub deadline: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            workers: DEFAULT_BATCH_WORKERS,
            deadline: DEFAULT_BATCH_DEADLINE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("at least one merchant identifier is required")]
    EmptyBatch,
    #[error("batch of {requested} merchants exceeds the limit of {max}")]
    TooLarge { requested: usize, max: usize },
}

/// Per-merchant failure captured inside a batch. The identifier is echoed as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub merchant_id: String,
    pub error: String,
}

/// Sealed outcome of one batch call.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub batch_id: BatchId,
    pub simulation: bool,
    pub total_merchants: usize,
    pub decisions: Vec<RiskDecision>,
    pub failures: Vec<BatchFailure>,
    pub report: Option<BatchReport>,
}

impl BatchResult {
    /// Merchants that neither succeeded nor failed before the deadline.
    pub fn abandoned(&self) -> usize {
        self.total_merchants
            .saturating_sub(self.decisions.len() + self.failures.len())
    }

    pub fn view(&self) -> BatchResultView {
        let message = self
            .decisions
            .is_empty()
            .then(|| "no merchants could be evaluated successfully".to_string());

        BatchResultView {
            batch_id: self.batch_id,
            simulation: self.simulation,
            total_merchants: self.total_merchants,
            successful: self.decisions.len(),
            failed: self.failures.len(),
            evaluated_at: self.report.as_ref().map(|report| report.evaluated_at),
            summary: self.report.as_ref().map(|report| report.summary.clone()),
            high_risk_merchants: self
                .report
                .as_ref()
                .map(|report| report.high_risk_merchants.clone())
                .unwrap_or_default(),
            errors: self.failures.clone(),
            message,
        }
    }
}

/// Wire view returned by the batch endpoint and the `batch` command.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResultView {
    pub batch_id: BatchId,
    pub simulation: bool,
    pub total_merchants: usize,
    pub successful: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BatchSummary>,
    pub high_risk_merchants: Vec<HighRiskMerchant>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BatchFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

enum Outcome {
    Decided {
        decision: RiskDecision,
        volume: Option<Decimal>,
    },
    Failed(BatchFailure),
}

/// Sealed accumulator contents in request order.
struct Sealed {
    decisions: Vec<RiskDecision>,
    failures: Vec<BatchFailure>,
    volumes: HashMap<MerchantId, Decimal>,
}

/// Shared sink for worker results. Once sealed, further records are dropped.
#[derive(Default)]
struct BatchAccumulator {
    sealed: bool,
    entries: Vec<(usize, Outcome)>,
}

impl BatchAccumulator {
    fn record(&mut self, index: usize, outcome: Outcome) -> bool {
        if self.sealed {
            return false;
        }
        self.entries.push((index, outcome));
        true
    }

    fn seal(&mut self) -> Sealed {
        self.sealed = true;
        let mut entries = std::mem::take(&mut self.entries);
        entries.sort_by_key(|(index, _)| *index);

        let mut sealed = Sealed {
            decisions: Vec::new(),
            failures: Vec::new(),
            volumes: HashMap::new(),
        };
        for (_, outcome) in entries {
            match outcome {
                Outcome::Decided { decision, volume } => {
                    if let Some(volume) = volume {
                        sealed.volumes.insert(decision.merchant_id, volume);
                    }
                    sealed.decisions.push(decision);
                }
                Outcome::Failed(failure) => sealed.failures.push(failure),
            }
        }
        sealed
    }
}

/// Fans a batch of merchant identifiers out over a bounded worker pool.
pub struct BatchEvaluator<M, D> {
    service: Arc<RiskDecisionService<M, D>>,
    settings: BatchSettings,
}

impl<M, D> BatchEvaluator<M, D>
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    pub fn new(service: Arc<RiskDecisionService<M, D>>, settings: BatchSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    pub fn service(&self) -> &Arc<RiskDecisionService<M, D>> {
        &self.service
    }

    pub async fn evaluate_batch(
        &self,
        merchant_ids: Vec<String>,
        simulate: bool,
    ) -> Result<BatchResult, BatchError> {
        let requested = merchant_ids.len();
        if requested == 0 {
            return Err(BatchError::EmptyBatch);
        }
        if requested > self.settings.max_batch_size {
            return Err(BatchError::TooLarge {
                requested,
                max: self.settings.max_batch_size,
            });
        }

        let batch_id = BatchId::new();
        let started = Instant::now();
        info!(%batch_id, requested, simulate, workers = self.settings.workers, "batch evaluation started");

        let semaphore = Arc::new(Semaphore::new(self.settings.workers.max(1)));
        let accumulator = Arc::new(Mutex::new(BatchAccumulator::default()));
        let mut tasks = JoinSet::new();

        for (index, raw_id) in merchant_ids.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let accumulator = Arc::clone(&accumulator);
            let service = Arc::clone(&self.service);

            tasks.spawn(async move {
                let Ok(permit) = semaphore.acquire_owned().await else {
                    return;
                };

                let failed_id = raw_id.clone();
                let sink = Arc::clone(&accumulator);
                let worker = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let outcome = evaluate_one(&service, &raw_id, simulate, batch_id);
                    let kept = sink
                        .lock()
                        .expect("batch accumulator mutex poisoned")
                        .record(index, outcome);
                    if !kept {
                        debug!(%batch_id, merchant_id = %raw_id, "dropping result after batch deadline");
                    }
                })
                .await;

                if let Err(error) = worker {
                    accumulator
                        .lock()
                        .expect("batch accumulator mutex poisoned")
                        .record(
                            index,
                            Outcome::Failed(BatchFailure {
                                merchant_id: failed_id,
                                error: format!("evaluation task failed: {error}"),
                            }),
                        );
                }
            });
        }

        let drained = tokio::time::timeout(self.settings.deadline, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                %batch_id,
                deadline_ms = self.settings.deadline.as_millis() as u64,
                outstanding = tasks.len(),
                "batch deadline elapsed; abandoning outstanding evaluations"
            );
            tasks.abort_all();
        }

        let Sealed {
            decisions,
            failures,
            volumes,
        } = accumulator
            .lock()
            .expect("batch accumulator mutex poisoned")
            .seal();

        if decisions.is_empty() {
            warn!(%batch_id, failed = failures.len(), "no merchants evaluated successfully");
        }

        let report = BatchReport::build(&decisions, &volumes);

        if let Some(report) = &report {
            for merchant in &report.high_risk_merchants {
                warn!(
                    %batch_id,
                    merchant_id = %merchant.merchant_id,
                    score = merchant.risk_score,
                    action = merchant.recommended_action.label(),
                    "high risk merchant in batch"
                );
            }
        }

        info!(
            %batch_id,
            requested,
            successful = decisions.len(),
            failed = failures.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "batch evaluation completed"
        );

        Ok(BatchResult {
            batch_id,
            simulation: simulate,
            total_merchants: requested,
            decisions,
            failures,
            report,
        })
    }
}

fn evaluate_one<M, D>(
    service: &RiskDecisionService<M, D>,
    raw_id: &str,
    simulate: bool,
    batch_id: BatchId,
) -> Outcome
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    let merchant_id = match MerchantId::parse(raw_id) {
        Ok(id) => id,
        Err(_) => {
            return Outcome::Failed(BatchFailure {
                merchant_id: raw_id.to_string(),
                error: INVALID_IDENTIFIER.to_string(),
            })
        }
    };

    match service.evaluate_for_batch(&merchant_id, simulate, Some(batch_id)) {
        Ok(decision) => {
            // Volume is re-read for the report; a failed read only drops it from the totals.
            let volume = match service.merchants().get(&merchant_id) {
                Ok(Some(merchant)) => Some(merchant.transaction_volume_30d),
                _ => None,
            };
            Outcome::Decided { decision, volume }
        }
        Err(error) => Outcome::Failed(BatchFailure {
            merchant_id: raw_id.to_string(),
            error: error.to_string(),
        }),
    }
}
