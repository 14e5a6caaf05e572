#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get as route_get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use priceopt_api::config::ServerConfig;
use priceopt_api::router::build_app_router;
use priceopt_api::state::AppState;
use priceopt_report::{PdfEngine, PdfOptions, RenderError};

/// Build a test `ServerConfig` pointing at `estimator_base_url`.
pub fn test_config(estimator_base_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:3000")],
        request_timeout_secs: 30,
        estimator_base_url: estimator_base_url.to_string(),
        estimator_timeout_secs: 5,
        booking_base_url: None,
        chromium_path: "chromium".to_string(),
        pdf_timeout_secs: 10,
    }
}

// ---------------------------------------------------------------------------
// Stand-in estimation service
// ---------------------------------------------------------------------------

/// Estimate id the stand-in service creates and serves with 7 comps.
pub const KNOWN_ID: &str = "est-123";
/// Estimate id served without comps.
pub const EMPTY_ID: &str = "est-empty";
/// Street that makes the stand-in service fail submission.
pub const FAILING_STREET: &str = "500 Error Ave";

pub fn estimate_json(id: &str, comp_count: usize) -> Value {
    let comps: Vec<Value> = (1..=comp_count)
        .map(|n| {
            json!({
                "id": format!("c{n}"),
                "address": format!("{n}00 Oak St"),
                "distance_km": 0.4 * n as f64,
                "beds": 2,
                "baths": 1.5,
                "sqft": 880,
                "adjusted_price": 440000.0 + 1000.0 * n as f64,
                "closed_or_listed_date": "2024-03-01T00:00:00",
            })
        })
        .collect();

    json!({
        "id": id,
        "created_at": "2024-05-01T14:05:09Z",
        "range_low": 420000.0,
        "range_high": 480000.0,
        "point_estimate": 450000.0,
        "confidence": "high",
        "comps": comps,
        "adjustments": { "size": -2000.0 },
    })
}

/// Requests received by the stand-in service.
#[derive(Default)]
pub struct EstimatorLog {
    pub submissions: Mutex<Vec<Value>>,
    pub lookups: AtomicUsize,
}

impl EstimatorLog {
    pub fn submissions(&self) -> Vec<Value> {
        self.submissions.lock().unwrap().clone()
    }
}

/// Serve a stand-in estimation service on an ephemeral port.
///
/// Returns its base URL and the request log.
pub async fn spawn_estimator() -> (String, Arc<EstimatorLog>) {
    let log = Arc::new(EstimatorLog::default());

    let submit_log = Arc::clone(&log);
    let lookup_log = Arc::clone(&log);
    let app = Router::new()
        .route(
            "/estimate",
            post(move |Json(body): Json<Value>| {
                let log = Arc::clone(&submit_log);
                async move {
                    log.submissions.lock().unwrap().push(body.clone());
                    if body["address"]["street"] == FAILING_STREET {
                        return (StatusCode::INTERNAL_SERVER_ERROR, "model offline").into_response();
                    }
                    Json(json!({ "id": KNOWN_ID, "status": "queued" })).into_response()
                }
            }),
        )
        .route(
            "/estimate/{id}",
            route_get(move |Path(id): Path<String>| {
                let log = Arc::clone(&lookup_log);
                async move {
                    log.lookups.fetch_add(1, Ordering::SeqCst);
                    match id.as_str() {
                        KNOWN_ID => Json(estimate_json(KNOWN_ID, 7)).into_response(),
                        EMPTY_ID => Json(estimate_json(EMPTY_ID, 0)).into_response(),
                        _ => (StatusCode::NOT_FOUND, "no such estimate").into_response(),
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), log)
}

// ---------------------------------------------------------------------------
// Stand-in PDF engine
// ---------------------------------------------------------------------------

/// Counts conversions and the sessions currently open.
#[derive(Default)]
pub struct CountingEngine {
    pub calls: AtomicUsize,
    pub active: AtomicUsize,
    pub fail: bool,
    pub last_html: Mutex<Option<String>>,
}

impl CountingEngine {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

struct Session<'a>(&'a AtomicUsize);

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PdfEngine for CountingEngine {
    async fn render_pdf(&self, html: &str, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        let _session = Session(&self.active);

        *self.last_html.lock().unwrap() = Some(html.to_string());
        if self.fail {
            return Err(RenderError::BrowserFailed {
                exit_code: Some(1),
                stderr: "renderer crashed".into(),
            });
        }
        Ok(b"%PDF-1.4 test".to_vec())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub engine: Arc<CountingEngine>,
    pub estimator: Arc<EstimatorLog>,
}

/// Full application wired to a fresh stand-in estimation service.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(CountingEngine::default(), |_| {}).await
}

pub async fn build_test_app_with(
    engine: CountingEngine,
    configure: impl FnOnce(&mut ServerConfig),
) -> TestApp {
    let (base_url, estimator) = spawn_estimator().await;
    let mut config = test_config(&base_url);
    configure(&mut config);

    let engine = Arc::new(engine);
    let state = AppState::new(config.clone(), engine.clone()).unwrap();

    TestApp {
        router: build_app_router(state, &config),
        engine,
        estimator,
    }
}

/// Application whose estimation service is not listening.
pub fn build_unreachable_app() -> Router {
    let config = test_config("http://127.0.0.1:1");
    let state = AppState::new(config.clone(), Arc::new(CountingEngine::default())).unwrap();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Form body of the reference submission.
pub const VALID_FORM: &str = "address=123+Main+St&city=X&state=CA&zip=12345&beds=2&baths=2.5\
&sqft=900&type=condo&condition=3&tenure=rent";

pub fn valid_json() -> Value {
    json!({
        "address": "123 Main St",
        "city": "X",
        "state": "CA",
        "zip": "12345",
        "beds": 2,
        "baths": 2.5,
        "sqft": 900,
        "type": "condo",
        "condition": 3,
        "tenure": "rent",
    })
}
