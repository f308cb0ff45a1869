#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use form_coach_service::services::providers::mock::MockTextProvider;
use form_coach_service::services::store::InMemoryStore;
use form_coach_service::startup::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SERVICE_NAME: &str = "form-coach-service-test";
pub const TEST_VIDEO_URL: &str = "https://storage.example.com/videos/bench-001.mp4";

/// Router wired to a scripted model and an in-memory store.
pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockTextProvider>,
    pub store: Arc<InMemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_provider(MockTextProvider::new(true))
    }

    pub fn with_provider(provider: MockTextProvider) -> Self {
        let provider = Arc::new(provider);
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(TEST_SERVICE_NAME, provider.clone(), store.clone());

        Self {
            router: build_router(state),
            provider,
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed to respond");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post_raw(&self, path: &str, body: impl Into<Body>) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(path)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, body.to_string()).await
    }

    pub async fn request(&self, method: Method, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// Supabase database-webhook body for a newly inserted video row.
pub fn trigger(url: &str) -> Value {
    json!({
        "type": "INSERT",
        "table": "videos",
        "schema": "public",
        "record": { "id": 17, "url": url },
        "old_record": null
    })
}

/// A scorecard that satisfies the output contract.
pub fn valid_scorecard() -> Value {
    json!({
        "context": {
            "camera_angle": "side view",
            "environment": "home gym",
            "visual_issues": "slightly dim lighting"
        },
        "overall_score": 72,
        "metrics": [
            { "name": "Scapular Retraction", "score": 70, "observed_flaw": "Shoulders roll forward at lockout", "recommendation": "Set the shoulder blades before unracking" },
            { "name": "Bar Path", "score": 65, "observed_flaw": "Bar travels straight up and down", "recommendation": "Press back toward the rack in a slight J curve" },
            { "name": "Elbow Position", "score": 75, "observed_flaw": "Elbows flare past 75 degrees", "recommendation": "Tuck elbows closer to the torso" },
            { "name": "Range of Motion", "score": 90, "observed_flaw": "Bar touches the chest every rep", "recommendation": "Keep the controlled touch" },
            { "name": "Wrist Alignment", "score": 0, "observed_flaw": "N/A", "recommendation": "N/A" },
            { "name": "Leg Drive", "score": 60, "observed_flaw": "Feet slide during the press", "recommendation": "Plant the feet and drive through the heels" }
        ]
    })
}

/// Model reply wrapped in a json code fence, as Gemini usually sends it.
pub fn fenced(value: &Value) -> String {
    format!("```json\n{:#}\n```", value)
}
