//! HTTP service for landmark photo verification.
//!
//! The `serve` command loads the landmark registry and classifier model once,
//! then answers `/verify-place`, `/classify-image` and `/health`. Startup
//! fails with a [`ServerError`] when either input is unavailable.
#![forbid(unsafe_code)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use landmark_core::{LandmarkRegistry, PlaceClassifier, VerificationEngine};
use tokio::net::TcpListener;

mod config;
mod error;
pub mod response;
mod routes;
mod state;

pub use config::{ModeArg, ServeArgs, ServeConfig};
pub use error::{ApiError, ServerError};
pub use routes::router;
pub use state::{
    AppState, ClassificationLimits, DEFAULT_CLASSIFICATION_TIMEOUT, DEFAULT_MAX_UPLOAD_BYTES,
    default_concurrency,
};

/// Run the service with the current process arguments and environment.
///
/// # Errors
/// Returns [`ServerError`] when arguments or configuration are invalid, when
/// the registry or model cannot be loaded, or when the listener fails.
pub async fn run() -> Result<(), ServerError> {
    let cli = Cli::try_parse().map_err(ServerError::ArgumentParsing)?;
    match cli.command {
        Command::Serve(args) => serve(args.into_config()?).await,
    }
}

/// Load the configured inputs and serve until interrupted.
///
/// # Errors
/// See [`run`].
pub async fn serve(config: ServeConfig) -> Result<(), ServerError> {
    config.validate_sources()?;
    let state = build_state(&config)?;
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(%address, mode = ?config.mode, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

/// Build the shared request state from a resolved configuration.
///
/// # Errors
/// Returns [`ServerError`] when the registry, engine or classifier cannot
/// be built.
pub fn build_state(config: &ServeConfig) -> Result<AppState, ServerError> {
    let registry = LandmarkRegistry::load(&config.registry, config.radius_meters)?;
    tracing::info!(
        landmarks = registry.len(),
        registry = %config.registry,
        "landmark registry loaded"
    );
    let engine = VerificationEngine::new(Arc::new(registry), config.mode)?;
    let classifier = load_classifier(config)?;
    Ok(AppState::new(engine, classifier, config.limits)?)
}

#[cfg(feature = "onnx")]
fn load_classifier(config: &ServeConfig) -> Result<Arc<dyn PlaceClassifier>, ServerError> {
    let model = config
        .model
        .as_deref()
        .ok_or(ServerError::MissingArgument {
            field: config::ARG_MODEL,
            env: config::ENV_MODEL,
        })?;
    let classifier =
        landmark_vision::OnnxPlaceClassifier::load(model, config.image_size, config.image_size)?;
    Ok(Arc::new(classifier))
}

#[cfg(not(feature = "onnx"))]
fn load_classifier(_config: &ServeConfig) -> Result<Arc<dyn PlaceClassifier>, ServerError> {
    Err(ServerError::MissingFeature {
        feature: "onnx",
        action: "loading the classifier model",
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[derive(Debug, Parser)]
#[command(
    name = "landmark-verifier",
    about = "Verify that photos were taken at registered landmarks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the verification API.
    Serve(ServeArgs),
}

#[cfg(test)]
mod tests;
