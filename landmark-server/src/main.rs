//! Entry point for the landmark verification service.
#![forbid(unsafe_code)]

use landmark_server::ServerError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    init_tracing();
    match landmark_server::run().await {
        Ok(()) => {}
        Err(ServerError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            report(&err);
            std::process::exit(1);
        }
    }
}

#[expect(clippy::print_stderr, reason = "fatal errors must reach the operator")]
fn report(err: &ServerError) {
    tracing::error!(error = %err, "landmark-verifier failed to start");
    eprintln!("landmark-verifier: {err}");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
