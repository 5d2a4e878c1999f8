//! Shared request state and classification scheduling.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use landmark_core::{ClassificationResult, PlaceClassifier, VerificationEngine};
use landmark_vision::{ImageNormaliser, TargetSizeError};
use tokio::sync::Semaphore;

use crate::error::ApiError;

/// Default per-request classification budget.
pub const DEFAULT_CLASSIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on request bodies: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Bounds applied to classification work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationLimits {
    /// Time allowed for queueing, decoding and inference together.
    pub timeout: Duration,
    /// Classifications allowed to run at once; later requests queue.
    pub max_concurrent: NonZeroUsize,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
}

impl Default for ClassificationLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CLASSIFICATION_TIMEOUT,
            max_concurrent: default_concurrency(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Number of CPUs available to the process, or one when unknown.
#[must_use]
pub fn default_concurrency() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Read-only state shared by every request.
///
/// Cloning is cheap: the engine, classifier and permit pool sit behind
/// `Arc`s.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<VerificationEngine>,
    classifier: Arc<dyn PlaceClassifier>,
    normaliser: ImageNormaliser,
    permits: Arc<Semaphore>,
    limits: ClassificationLimits,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("normaliser", &self.normaliser)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Assemble the state. Uploads are normalised to the classifier's input
    /// size.
    ///
    /// # Errors
    /// Returns [`TargetSizeError`] when the classifier reports a zero input
    /// dimension.
    pub fn new(
        engine: VerificationEngine,
        classifier: Arc<dyn PlaceClassifier>,
        limits: ClassificationLimits,
    ) -> Result<Self, TargetSizeError> {
        let (width, height) = classifier.input_size();
        let normaliser = ImageNormaliser::new(width, height)?;
        Ok(Self {
            engine: Arc::new(engine),
            classifier,
            normaliser,
            permits: Arc::new(Semaphore::new(limits.max_concurrent.get())),
            limits,
        })
    }

    /// Verification engine.
    #[must_use]
    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    /// Configured limits.
    #[must_use]
    pub const fn limits(&self) -> ClassificationLimits {
        self.limits
    }

    /// Normalise and classify an upload, then interpret the distribution.
    ///
    /// The blocking work runs on Tokio's blocking pool once a permit is
    /// available. The timeout covers waiting for the permit as well. A
    /// classification that outlives its request keeps its permit until the
    /// classifier returns.
    pub(crate) async fn classify(&self, upload: Bytes) -> Result<ClassificationResult, ApiError> {
        let permits = Arc::clone(&self.permits);
        let classifier = Arc::clone(&self.classifier);
        let normaliser = self.normaliser;
        let timeout = self.limits.timeout;

        let work = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|err| ApiError::Task {
                    reason: err.to_string(),
                })?;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let tensor = normaliser.normalise(&upload)?;
                classifier.classify(&tensor).map_err(ApiError::from)
            })
            .await
            .map_err(|err| ApiError::Task {
                reason: err.to_string(),
            })?
        };

        let distribution = tokio::time::timeout(timeout, work)
            .await
            .map_err(|_| ApiError::ClassificationTimeout { timeout })??;
        Ok(self.engine.interpret(distribution)?)
    }
}
