//! In-process harness: mock directory, shared deps and the real router.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use snitch_core::kernel::{MetricsRegistry, MockDirectory, ServerDeps};
use snitch_core::server::build_app;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use super::sync_config;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestHarness {
    pub directory: MockDirectory,
    pub deps: Arc<ServerDeps>,
    pub app: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is JSON")
    }
}

impl TestHarness {
    pub fn new(directory: MockDirectory) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let deps = Arc::new(ServerDeps::new(
            Arc::new(directory.clone()),
            sync_config(),
            Arc::new(MetricsRegistry::new()),
        ));
        let app = build_app(deps.clone(), REQUEST_TIMEOUT);

        Self {
            directory,
            deps,
            app,
        }
    }

    pub async fn request(&self, method: Method, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            content_type,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path).await
    }
}
