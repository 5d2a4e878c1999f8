//! Shared helpers for driving the router in-process.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use landmark_core::test_support::{catalogue_registry, single_landmark_registry};
use landmark_core::{
    ClassifierError, ImageTensor, PlaceClassifier, VerificationEngine, VerificationMode,
};
use landmark_server::{AppState, ClassificationLimits, router};
use landmark_vision::test_support::encode_png;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "landmark-verifier-test-boundary";

/// Incrementally built `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, contents: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(contents);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// A file part sent without any `filename` parameter.
    pub fn unnamed_file(mut self, name: &str, contents: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                .as_bytes(),
        );
        self.bytes.extend_from_slice(contents);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.bytes))
            .expect("valid request")
    }
}

/// A small PNG photo.
pub fn photo() -> Vec<u8> {
    encode_png(32, 24, [120, 110, 90]).expect("encode png")
}

/// Classifier returning a fixed distribution and counting its calls.
#[derive(Debug)]
pub struct CountingClassifier {
    distribution: Vec<f32>,
    delay: Duration,
    calls: AtomicUsize,
}

impl CountingClassifier {
    pub fn new(distribution: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            distribution,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(distribution: Vec<f32>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            distribution,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlaceClassifier for CountingClassifier {
    fn input_size(&self) -> (u32, u32) {
        (16, 16)
    }

    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(input.shape(), [1, 16, 16, 3]);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(self.distribution.clone())
    }
}

/// Classifier whose runtime always fails.
#[derive(Debug)]
pub struct FailingClassifier;

impl PlaceClassifier for FailingClassifier {
    fn input_size(&self) -> (u32, u32) {
        (16, 16)
    }

    fn classify(&self, _input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        Err(ClassifierError::Inference {
            reason: "runtime unavailable".to_owned(),
        })
    }
}

/// Router over the demo registry with a 25 m radius: two located landmarks
/// and the catalogue-only label `3`.
pub fn multi_app(classifier: Arc<dyn PlaceClassifier>, limits: ClassificationLimits) -> Router {
    let registry = catalogue_registry(25.0).expect("catalogue registry");
    let engine = VerificationEngine::new(Arc::new(registry), VerificationMode::MultiLandmark)
        .expect("multi-landmark engine");
    router(AppState::new(engine, classifier, limits).expect("valid state"))
}

/// Router over the single-landmark registry with a 25 m radius.
pub fn single_app(classifier: Arc<dyn PlaceClassifier>) -> Router {
    let registry = single_landmark_registry(25.0).expect("single registry");
    let engine = VerificationEngine::new(Arc::new(registry), VerificationMode::single())
        .expect("single-landmark engine");
    router(AppState::new(engine, classifier, ClassificationLimits::default()).expect("valid state"))
}

/// Send `request` and decode the JSON response.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).expect("JSON body");
    (status, json)
}
