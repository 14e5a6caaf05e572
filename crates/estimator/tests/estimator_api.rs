//! Integration tests for [`EstimatorApi`] against a stand-in estimation
//! service served by axum on an ephemeral port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use priceopt_core::intake::RawIntake;
use priceopt_core::types::Confidence;
use priceopt_estimator::{EstimatorApi, EstimatorError};
use serde_json::{json, Value};

type Received = Arc<Mutex<Vec<Value>>>;

async fn create(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
    received.lock().unwrap().push(body);
    Json(json!({ "id": "est-123", "point_estimate": 450000.0 }))
}

async fn fetch(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    match id.as_str() {
        "est-123" => Ok(Json(json!({
            "id": "est-123",
            "created_at": "2024-05-01T12:00:00",
            "range_low": 400000.0,
            "range_high": 500000.0,
            "point_estimate": 450000.0,
            "confidence": "high",
            "comps": [],
            "adjustments": {}
        }))),
        "broken" => Ok(Json(json!({
            "id": "broken",
            "created_at": "2024-05-01T12:00:00",
            "range_low": 500000.0,
            "range_high": 400000.0,
            "point_estimate": 450000.0,
            "confidence": "low",
            "comps": []
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn spawn_service() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/estimate", post(create))
        .route("/estimate/{id}", get(fetch))
        .with_state(Arc::clone(&received));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), received)
}

fn valid_request() -> priceopt_core::types::EstimateRequest {
    RawIntake {
        address: "123 Main St".into(),
        city: "X".into(),
        state: "CA".into(),
        zip: "12345".into(),
        beds: "2".into(),
        baths: "2.5".into(),
        sqft: "900".into(),
        property_type: "condo".into(),
        condition: "3".into(),
        tenure: "rent".into(),
    }
    .validate()
    .unwrap()
}

#[tokio::test]
async fn submit_sends_normalized_body_and_returns_id() {
    let (base, received) = spawn_service().await;
    let api = EstimatorApi::new(&base, Duration::from_secs(5)).unwrap();

    let created = api.submit_estimate(&valid_request()).await.unwrap();
    assert_eq!(created.id, "est-123");

    let bodies = received.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "address": { "street": "123 Main St", "city": "X", "state": "CA", "zip": "12345" },
            "property": {
                "beds": 2, "baths": 2.5, "sqft": 900,
                "type": "condo", "condition": 3, "tenure": "rent"
            }
        })
    );
}

#[tokio::test]
async fn get_returns_parsed_result() {
    let (base, _) = spawn_service().await;
    let api = EstimatorApi::new(&base, Duration::from_secs(5)).unwrap();

    let result = api.get_estimate("est-123").await.unwrap();
    assert_eq!(result.id, "est-123");
    assert_eq!(result.confidence, Confidence::High);
    assert!(result.comps.is_empty());
}

#[tokio::test]
async fn unknown_id_is_an_api_error() {
    let (base, _) = spawn_service().await;
    let api = EstimatorApi::new(&base, Duration::from_secs(5)).unwrap();

    let err = api.get_estimate("missing").await.unwrap_err();
    assert_matches!(err, EstimatorError::ApiError { status: 404, .. });
    assert!(err.is_not_found());
}

#[tokio::test]
async fn result_violating_range_is_rejected() {
    let (base, _) = spawn_service().await;
    let api = EstimatorApi::new(&base, Duration::from_secs(5)).unwrap();

    let err = api.get_estimate("broken").await.unwrap_err();
    assert_matches!(err, EstimatorError::InvalidPayload(_));
}

#[tokio::test]
async fn unreachable_service_is_a_request_error() {
    // Bind then drop a listener to get a port nobody is serving.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = EstimatorApi::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = api.get_estimate("est-123").await.unwrap_err();
    assert_matches!(err, EstimatorError::Request(_));
}
