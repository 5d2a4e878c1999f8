//! `serve` command configuration.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use landmark_core::{DEFAULT_ACCEPTANCE_THRESHOLD, VerificationMode};
use landmark_vision::DEFAULT_INPUT_SIZE;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::ServerError;
use crate::state::{ClassificationLimits, DEFAULT_MAX_UPLOAD_BYTES, default_concurrency};

pub(crate) const ARG_HOST: &str = "host";
pub(crate) const ARG_PORT: &str = "port";
pub(crate) const ARG_REGISTRY: &str = "registry";
pub(crate) const ARG_MODEL: &str = "model";
pub(crate) const ARG_RADIUS_METERS: &str = "radius-meters";
pub(crate) const ARG_MODE: &str = "mode";
pub(crate) const ARG_ACCEPTANCE_THRESHOLD: &str = "acceptance-threshold";
pub(crate) const ARG_IMAGE_SIZE: &str = "image-size";
pub(crate) const ARG_CLASSIFICATION_TIMEOUT_MS: &str = "classification-timeout-ms";
pub(crate) const ARG_MAX_CONCURRENT_CLASSIFICATIONS: &str = "max-concurrent-classifications";
pub(crate) const ARG_MAX_UPLOAD_BYTES: &str = "max-upload-bytes";
pub(crate) const ENV_REGISTRY: &str = "LANDMARK_CMDS_SERVE_REGISTRY";
#[cfg(feature = "onnx")]
pub(crate) const ENV_MODEL: &str = "LANDMARK_CMDS_SERVE_MODEL";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RADIUS_METERS: f64 = 10.0;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// How classifier output is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeArg {
    /// Several landmarks; argmax over a probability per label.
    #[default]
    Multi,
    /// One landmark; a single score compared with the threshold.
    Single,
}

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve the landmark verification API. Settings can come \
                 from CLI flags, configuration files, or environment \
                 variables.",
    about = "Serve the landmark verification API"
)]
#[ortho_config(prefix = "LANDMARK")]
pub struct ServeArgs {
    /// Interface to bind.
    #[arg(long = ARG_HOST, value_name = "addr")]
    #[serde(default)]
    pub host: Option<String>,
    /// Port to listen on.
    #[arg(long = ARG_PORT, value_name = "port")]
    #[serde(default)]
    pub port: Option<u16>,
    /// Path to the JSON landmark registry.
    #[arg(long = ARG_REGISTRY, value_name = "path")]
    #[serde(default)]
    pub registry: Option<Utf8PathBuf>,
    /// Path to the ONNX classifier model.
    #[arg(long = ARG_MODEL, value_name = "path")]
    #[serde(default)]
    pub model: Option<Utf8PathBuf>,
    /// Radius tolerance for landmarks that do not set their own.
    #[arg(long = ARG_RADIUS_METERS, value_name = "metres")]
    #[serde(default)]
    pub radius_meters: Option<f64>,
    /// How classifier output is read.
    #[arg(long = ARG_MODE, value_enum)]
    #[serde(default)]
    pub mode: Option<ModeArg>,
    /// Score a single-landmark photo must exceed.
    #[arg(long = ARG_ACCEPTANCE_THRESHOLD, value_name = "score")]
    #[serde(default)]
    pub acceptance_threshold: Option<f32>,
    /// Side length of the square model input.
    #[arg(long = ARG_IMAGE_SIZE, value_name = "pixels")]
    #[serde(default)]
    pub image_size: Option<u32>,
    /// Per-request classification budget.
    #[arg(long = ARG_CLASSIFICATION_TIMEOUT_MS, value_name = "ms")]
    #[serde(default)]
    pub classification_timeout_ms: Option<u64>,
    /// Classifications allowed to run at once.
    #[arg(long = ARG_MAX_CONCURRENT_CLASSIFICATIONS, value_name = "count")]
    #[serde(default)]
    pub max_concurrent_classifications: Option<usize>,
    /// Largest accepted request body.
    #[arg(long = ARG_MAX_UPLOAD_BYTES, value_name = "bytes")]
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,
}

impl ServeArgs {
    /// Merge configuration files and environment over the CLI flags and
    /// resolve defaults.
    ///
    /// # Errors
    /// Returns [`ServerError`] when layering fails or a required or invalid
    /// setting is found.
    pub fn into_config(self) -> Result<ServeConfig, ServerError> {
        let merged = self.load_and_merge().map_err(ServerError::Configuration)?;
        ServeConfig::try_from(merged)
    }
}

/// Resolved `serve` configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// JSON landmark registry.
    pub registry: Utf8PathBuf,
    /// ONNX classifier model.
    pub model: Option<Utf8PathBuf>,
    /// Deployment radius tolerance in metres.
    pub radius_meters: f64,
    /// Verification mode.
    pub mode: VerificationMode,
    /// Side length of the square model input.
    pub image_size: u32,
    /// Classification scheduling bounds.
    pub limits: ClassificationLimits,
}

impl ServeConfig {
    /// `host:port` to listen on.
    #[must_use]
    pub fn bind_address(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    /// Check that every configured input file exists.
    ///
    /// # Errors
    /// Returns [`ServerError::MissingSourceFile`],
    /// [`ServerError::SourcePathNotFile`] or
    /// [`ServerError::InspectSourcePath`].
    pub fn validate_sources(&self) -> Result<(), ServerError> {
        Self::require_existing(&self.registry, ARG_REGISTRY)?;
        if let Some(model) = &self.model {
            Self::require_existing(model, ARG_MODEL)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), ServerError> {
        match landmark_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(ServerError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(ServerError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(ServerError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = ServerError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let registry = args.registry.ok_or(ServerError::MissingArgument {
            field: ARG_REGISTRY,
            env: ENV_REGISTRY,
        })?;
        let model = resolve_model(args.model)?;

        let radius_meters = args.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS);
        if !(radius_meters.is_finite() && radius_meters > 0.0) {
            return Err(invalid(
                ARG_RADIUS_METERS,
                format!("must be a positive number of metres, got {radius_meters}"),
            ));
        }

        let mode = match args.mode.unwrap_or_default() {
            ModeArg::Multi => VerificationMode::MultiLandmark,
            ModeArg::Single => VerificationMode::SingleLandmark {
                acceptance_threshold: args
                    .acceptance_threshold
                    .unwrap_or(DEFAULT_ACCEPTANCE_THRESHOLD),
            },
        };

        let image_size = args.image_size.unwrap_or(DEFAULT_INPUT_SIZE);
        if image_size == 0 {
            return Err(invalid(ARG_IMAGE_SIZE, "must be at least 1 pixel".to_owned()));
        }

        let timeout_ms = args.classification_timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(invalid(
                ARG_CLASSIFICATION_TIMEOUT_MS,
                "must be at least 1 ms".to_owned(),
            ));
        }

        let max_concurrent = match args.max_concurrent_classifications {
            Some(count) => NonZeroUsize::new(count).ok_or_else(|| {
                invalid(
                    ARG_MAX_CONCURRENT_CLASSIFICATIONS,
                    "must be at least 1".to_owned(),
                )
            })?,
            None => default_concurrency(),
        };

        let max_upload_bytes = args.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            return Err(invalid(ARG_MAX_UPLOAD_BYTES, "must be at least 1 byte".to_owned()));
        }

        Ok(Self {
            host: args.host.unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: args.port.unwrap_or(DEFAULT_PORT),
            registry,
            model,
            radius_meters,
            mode,
            image_size,
            limits: ClassificationLimits {
                timeout: Duration::from_millis(timeout_ms),
                max_concurrent,
                max_upload_bytes,
            },
        })
    }
}

#[cfg(feature = "onnx")]
fn resolve_model(model: Option<Utf8PathBuf>) -> Result<Option<Utf8PathBuf>, ServerError> {
    model.map(Some).ok_or(ServerError::MissingArgument {
        field: ARG_MODEL,
        env: ENV_MODEL,
    })
}

#[cfg(not(feature = "onnx"))]
fn resolve_model(model: Option<Utf8PathBuf>) -> Result<Option<Utf8PathBuf>, ServerError> {
    Ok(model)
}

fn invalid(field: &'static str, reason: String) -> ServerError {
    ServerError::InvalidSetting { field, reason }
}
