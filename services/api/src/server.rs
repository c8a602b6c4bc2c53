use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDecisionRepository, InMemoryMerchantRepository};
use crate::routes::with_risk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use payout_risk::config::AppConfig;
use payout_risk::error::AppError;
use payout_risk::risk::{MerchantFixtureImporter, RiskApi, RiskDecisionService, ScoringThresholds};
use payout_risk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let merchants = Arc::new(InMemoryMerchantRepository::default());
    if let Some(path) = &config.risk.merchant_fixtures {
        let loaded = merchants.seed(MerchantFixtureImporter::from_path(path)?);
        info!(path = %path.display(), loaded, "merchant fixtures loaded");
    }

    let service = Arc::new(RiskDecisionService::new(
        merchants,
        Arc::new(InMemoryDecisionRepository::default()),
        ScoringThresholds::default(),
    ));
    let api = Arc::new(RiskApi::new(service, config.risk.batch_settings()));

    let app = with_risk_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        workers = config.risk.batch_workers,
        max_batch = config.risk.max_batch_size,
        "payout risk service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
