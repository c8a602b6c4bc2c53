use crate::infra::{InMemoryDecisionRepository, InMemoryMerchantRepository};
use clap::Args;
use payout_risk::config::{AppConfig, ConfigError};
use payout_risk::error::AppError;
use payout_risk::risk::{
    BatchEvaluator, BatchResultView, MerchantFixtureImporter, RiskDecisionService,
    ScoringThresholds,
};
use payout_risk::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct BatchArgs {
    /// Merchant CSV fixture. Defaults to RISK_MERCHANT_FIXTURES.
    pub(crate) fixtures: Option<PathBuf>,
    /// Override the configured number of concurrent evaluations
    #[arg(long)]
    pub(crate) workers: Option<usize>,
    /// Persist decisions instead of running a simulation
    #[arg(long)]
    pub(crate) persist: bool,
}

pub(crate) async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let path = args
        .fixtures
        .or_else(|| config.risk.merchant_fixtures.clone())
        .ok_or(ConfigError::InvalidSetting {
            key: "RISK_MERCHANT_FIXTURES",
        })?;

    let mut settings = config.risk.batch_settings();
    if let Some(workers) = args.workers.filter(|workers| *workers > 0) {
        settings.workers = workers;
    }

    let views = evaluate_fixtures(path, settings, !args.persist).await?;
    for view in views {
        match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("batch view unavailable: {err}"),
        }
    }

    Ok(())
}

/// Loads the fixture and evaluates it in chunks no larger than the batch limit.
pub(crate) async fn evaluate_fixtures(
    path: PathBuf,
    settings: payout_risk::risk::BatchSettings,
    simulate: bool,
) -> Result<Vec<BatchResultView>, AppError> {
    let merchants = MerchantFixtureImporter::from_path(&path)?;
    let repository = Arc::new(InMemoryMerchantRepository::default());
    let loaded = repository.seed(merchants);
    info!(path = %path.display(), loaded, "merchant fixtures loaded");

    let ids: Vec<String> = repository.ids().iter().map(ToString::to_string).collect();
    let decisions = Arc::new(InMemoryDecisionRepository::default());
    let service = Arc::new(RiskDecisionService::new(
        repository,
        decisions.clone(),
        ScoringThresholds::default(),
    ));
    let evaluator = BatchEvaluator::new(service, settings);

    let mut views = Vec::new();
    for chunk in ids.chunks(settings.max_batch_size.max(1)) {
        let result = evaluator.evaluate_batch(chunk.to_vec(), simulate).await?;
        views.push(result.view());
    }

    info!(batches = views.len(), stored = decisions.len(), simulate, "fixture evaluation finished");
    Ok(views)
}
