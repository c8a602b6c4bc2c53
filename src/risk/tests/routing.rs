use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::risk::domain::MerchantId;
use crate::risk::router::{evaluate_handler, EvaluateRequest};
use crate::risk::{BatchSettings, RiskApi, RiskDecisionService, ScoringThresholds};

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn evaluate_route_persists_decision() {
    let merchant = high_risk_merchant();
    let (service, _, decisions) = build_service(vec![merchant.clone()]);
    let router = risk_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/risk/evaluate",
            json!({ "merchant_id": merchant.id.to_string() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["risk_score"], 70);
    assert_eq!(body["risk_level"], "HIGH");
    assert_eq!(body["payout_hold_period"], "45_DAYS");
    assert_eq!(body["simulation"], false);
    assert!(body.get("decision_id").is_some());
    assert_eq!(decisions.create_calls(), 1);
}

#[tokio::test]
async fn evaluate_route_rejects_malformed_identifier() {
    let (service, _, _) = build_service(Vec::new());
    let router = risk_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/risk/evaluate",
            json!({ "merchant_id": "merchant-42" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "invalid merchant identifier format");
}

#[tokio::test]
async fn evaluate_handler_maps_missing_merchant_to_not_found() {
    let (service, _, _) = build_service(Vec::new());
    let api = Arc::new(RiskApi::new(Arc::new(service), BatchSettings::default()));

    let response = evaluate_handler::<MemoryMerchants, MemoryDecisions>(
        State(api),
        axum::Json(EvaluateRequest {
            merchant_id: MerchantId::new().to_string(),
            simulation: true,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn evaluate_handler_maps_store_failure_to_internal_error() {
    let service = RiskDecisionService::new(
        Arc::new(UnavailableMerchants),
        Arc::new(MemoryDecisions::default()),
        ScoringThresholds::default(),
    );
    let api = Arc::new(RiskApi::new(Arc::new(service), BatchSettings::default()));

    let response = evaluate_handler::<UnavailableMerchants, MemoryDecisions>(
        State(api),
        axum::Json(EvaluateRequest {
            merchant_id: MerchantId::new().to_string(),
            simulation: false,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn simulate_route_applies_overrides() {
    let merchant = unverified_merchant();
    let (service, _, decisions) = build_service(vec![merchant.clone()]);
    let router = risk_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/risk/simulate",
            json!({
                "merchant_id": merchant.id.to_string(),
                "overrides": { "kyc_verified": true, "velocity_multiplier": "fast" },
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["risk_score"], 8);
    assert_eq!(body["simulation"], true);
    assert_eq!(decisions.create_calls(), 0);
}

#[tokio::test]
async fn profile_route_returns_snapshot_and_policy() {
    let merchant = trusted_merchant();
    let (service, _, _) = build_service(vec![merchant.clone()]);
    service.evaluate(&merchant.id, false).expect("evaluation");
    let router = risk_router_with_service(service);

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/risk/merchants/{}/profile", merchant.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["merchant_name"], "Corner Grocer");
    assert_eq!(body["industry"], "RETAIL");
    assert_eq!(body["current_policy"]["risk_score"], 5);
    assert_eq!(body["current_policy"]["payout_hold_period"], "IMMEDIATE");
}

#[tokio::test]
async fn profile_route_returns_not_found_for_unknown_merchant() {
    let (service, _, _) = build_service(Vec::new());
    let router = risk_router_with_service(service);

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/risk/merchants/{}/profile", MerchantId::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_route_returns_view_with_errors() {
    let merchant = critical_merchant();
    let (service, _, _) = build_service(vec![merchant.clone()]);
    let router = risk_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/risk/batch-evaluate",
            json!({
                "merchant_ids": [merchant.id.to_string(), "nope"],
                "simulation": true,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total_merchants"], 2);
    assert_eq!(body["successful"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["merchant_id"], "nope");
    assert_eq!(
        body["high_risk_merchants"][0]["recommended_action"],
        "Immediate manual approval required"
    );
}

#[tokio::test]
async fn batch_route_rejects_empty_requests() {
    let (service, _, _) = build_service(Vec::new());
    let router = risk_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/risk/batch-evaluate",
            json!({ "merchant_ids": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "at least one merchant identifier is required");
}

#[tokio::test]
async fn slow_store_does_not_stall_the_executor() {
    let merchant = trusted_merchant();
    let store = Arc::new(SlowMerchants::new(
        vec![merchant.clone()],
        std::time::Duration::from_millis(300),
    ));
    let service = RiskDecisionService::new(
        store,
        Arc::new(MemoryDecisions::default()),
        ScoringThresholds::default(),
    );
    let api = Arc::new(RiskApi::new(Arc::new(service), BatchSettings::default()));

    let request = tokio::spawn(evaluate_handler::<SlowMerchants, MemoryDecisions>(
        State(api),
        axum::Json(EvaluateRequest {
            merchant_id: merchant.id.to_string(),
            simulation: true,
        }),
    ));

    let started = std::time::Instant::now();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(
        started.elapsed() < std::time::Duration::from_millis(200),
        "timer was delayed {:?} by the store call",
        started.elapsed()
    );

    let response = request.await.expect("handler task");
    assert_eq!(response.status(), StatusCode::OK);
}
