use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::batch::{BatchEvaluator, BatchSettings};
use super::domain::MerchantId;
use super::overrides::SimulationOverrides;
use super::repository::{DecisionRepository, MerchantRepository};
use super::service::{RiskDecisionService, RiskServiceError};

/// State shared by the risk handlers.
pub struct RiskApi<M, D> {
    service: Arc<RiskDecisionService<M, D>>,
    batch: BatchEvaluator<M, D>,
}

impl<M, D> RiskApi<M, D>
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    pub fn new(service: Arc<RiskDecisionService<M, D>>, settings: BatchSettings) -> Self {
        let batch = BatchEvaluator::new(Arc::clone(&service), settings);
        Self { service, batch }
    }

    pub fn service(&self) -> &Arc<RiskDecisionService<M, D>> {
        &self.service
    }

    pub fn batch(&self) -> &BatchEvaluator<M, D> {
        &self.batch
    }
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub merchant_id: String,
    #[serde(default)]
    pub simulation: bool,
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub merchant_id: String,
    #[serde(default)]
    pub overrides: SimulationOverrides,
}

#[derive(Debug, Deserialize)]
pub struct BatchEvaluateRequest {
    pub merchant_ids: Vec<String>,
    #[serde(default)]
    pub simulation: bool,
}

/// Router builder exposing evaluation, simulation, profile and batch endpoints.
pub fn risk_router<M, D>(api: Arc<RiskApi<M, D>>) -> Router
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    Router::new()
        .route("/api/v1/risk/evaluate", post(evaluate_handler::<M, D>))
        .route("/api/v1/risk/simulate", post(simulate_handler::<M, D>))
        .route(
            "/api/v1/risk/merchants/:merchant_id/profile",
            get(profile_handler::<M, D>),
        )
        .route(
            "/api/v1/risk/batch-evaluate",
            post(batch_handler::<M, D>),
        )
        .with_state(api)
}

pub(crate) async fn evaluate_handler<M, D>(
    State(api): State<Arc<RiskApi<M, D>>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    let Some(merchant_id) = parse_merchant_id(&request.merchant_id) else {
        return invalid_identifier();
    };

    let service = Arc::clone(&api.service);
    let simulate = request.simulation;
    respond(move || service.evaluate(&merchant_id, simulate)).await
}

pub(crate) async fn simulate_handler<M, D>(
    State(api): State<Arc<RiskApi<M, D>>>,
    axum::Json(request): axum::Json<SimulateRequest>,
) -> Response
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    let Some(merchant_id) = parse_merchant_id(&request.merchant_id) else {
        return invalid_identifier();
    };

    let service = Arc::clone(&api.service);
    let overrides = request.overrides;
    respond(move || service.simulate(&merchant_id, &overrides)).await
}

pub(crate) async fn profile_handler<M, D>(
    State(api): State<Arc<RiskApi<M, D>>>,
    Path(merchant_id): Path<String>,
) -> Response
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    let Some(merchant_id) = parse_merchant_id(&merchant_id) else {
        return invalid_identifier();
    };

    let service = Arc::clone(&api.service);
    respond(move || service.profile(&merchant_id)).await
}

pub(crate) async fn batch_handler<M, D>(
    State(api): State<Arc<RiskApi<M, D>>>,
    axum::Json(request): axum::Json<BatchEvaluateRequest>,
) -> Response
where
    M: MerchantRepository + 'static,
    D: DecisionRepository + 'static,
{
    match api
        .batch
        .evaluate_batch(request.merchant_ids, request.simulation)
        .await
    {
        Ok(result) => (StatusCode::OK, axum::Json(result.view())).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

/// Runs a repository-backed service call off the async executor.
async fn respond<T, F>(call: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, RiskServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(Ok(body)) => (StatusCode::OK, axum::Json(body)).into_response(),
        Ok(Err(error)) => service_error(error),
        Err(join_error) => {
            let payload = json!({
                "error": format!("request handling failed: {join_error}"),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn parse_merchant_id(raw: &str) -> Option<MerchantId> {
    MerchantId::parse(raw).ok()
}

fn invalid_identifier() -> Response {
    let payload = json!({
        "error": "invalid merchant identifier format",
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn service_error(error: RiskServiceError) -> Response {
    let status = match &error {
        RiskServiceError::MerchantNotFound(_) => StatusCode::NOT_FOUND,
        RiskServiceError::MerchantLookup { .. }
        | RiskServiceError::DecisionWrite { .. }
        | RiskServiceError::DecisionLookup { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
