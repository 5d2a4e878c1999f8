//! Error types emitted by the verification service.
//!
//! [`ServerError`] covers startup and is fatal: the process refuses to serve
//! without a registry and classifier. [`ApiError`] covers a single request and
//! is always turned into a JSON response.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use camino::Utf8PathBuf;
use landmark_core::{
    ClassificationError, ClassifierError, CoordinateError, EngineConfigError, RegistryError,
};
#[cfg(feature = "onnx")]
use landmark_vision::ModelLoadError;
use landmark_vision::{ImageDecodeError, TargetSizeError};
use thiserror::Error;

use crate::response::ErrorBody;

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable name.
        env: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// Cargo feature name.
        feature: &'static str,
        /// Operation that needed it.
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Configured path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the path.
        field: &'static str,
        /// Configured path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Configured path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A setting holds a value the service cannot run with.
    #[error("invalid {field}: {reason}")]
    InvalidSetting {
        /// Flag name.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
    /// The landmark registry could not be loaded.
    #[error("failed to load landmark registry: {0}")]
    Registry(#[from] RegistryError),
    /// The registry and verification mode do not fit together.
    #[error("invalid verification setup: {0}")]
    Engine(#[from] EngineConfigError),
    /// The classifier model could not be loaded.
    #[cfg(feature = "onnx")]
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    /// The classifier reports an unusable input size.
    #[error("invalid classifier input size: {0}")]
    InputSize(#[from] TargetSizeError),
    /// The listening socket could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Requested `host:port`.
        address: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The server stopped with an IO error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Errors scoped to a single request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required multipart field was not sent.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Field name.
        field: &'static str,
    },
    /// The image part carries no filename.
    #[error("no file selected for `{field}`")]
    EmptyFilename {
        /// Field name.
        field: &'static str,
    },
    /// `lat` or `lon` is malformed or out of range.
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
    /// The upload is not a decodable image.
    #[error(transparent)]
    ImageDecode(#[from] ImageDecodeError),
    /// The multipart body could not be read.
    #[error("invalid multipart body: {reason}")]
    Multipart {
        /// Status reported by the extractor.
        status: StatusCode,
        /// Extractor message.
        reason: String,
    },
    /// Classification did not finish in time.
    #[error("classification did not finish within {} ms", timeout.as_millis())]
    ClassificationTimeout {
        /// Configured limit.
        timeout: Duration,
    },
    /// The classifier failed.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    /// The classifier returned an unusable distribution.
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    /// The classification task could not be run to completion.
    #[error("classification task failed: {reason}")]
    Task {
        /// Runtime message.
        reason: String,
    },
}

impl ApiError {
    /// HTTP status reported for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingField { .. }
            | Self::EmptyFilename { .. }
            | Self::Coordinate(_)
            | Self::ImageDecode(_) => StatusCode::BAD_REQUEST,
            Self::Multipart { status, .. } => *status,
            Self::ClassificationTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::Classifier(_) | Self::Classification(_) | Self::Task { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
