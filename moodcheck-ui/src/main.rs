//! moodcheck-ui - Classroom emotion check-in service
//!
//! Students record a mood and a freehand drawing; teachers sign in and view
//! aggregated mood statistics plus the drawings. Persistence and identity are
//! delegated to the Firebase backend named in the config file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use moodcheck_common::config::{load_config, resolve_config_path};
use moodcheck_ui::store::{FirebaseAuthClient, FirebaseStorageClient, FirestoreClient};
use moodcheck_ui::{build_router, AppState};

/// Listen address; one classroom, one box
const LISTEN_ADDR: &str = "127.0.0.1:5780";

#[derive(Debug, Parser)]
#[command(name = "moodcheck-ui", version, about = "Classroom emotion check-in service")]
struct Args {
    /// Path to the TOML config file holding the [firebase] credentials
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting moodcheck-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    // Configuration is startup-fatal: no screen is served without a complete
    // credential set.
    let config_path = resolve_config_path(args.config.as_deref())?;
    info!("Config file: {}", config_path.display());
    let config = load_config(&config_path)?;
    info!("✓ Backend credentials loaded (project {})", config.project_id);

    let state = AppState::new(
        Arc::new(FirebaseStorageClient::new(&config)?),
        Arc::new(FirestoreClient::new(&config)),
        Arc::new(FirebaseAuthClient::new(&config)),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR).await?;
    info!("moodcheck-ui listening on http://{}", LISTEN_ADDR);
    info!("Health check: http://{}/health", LISTEN_ADDR);

    axum::serve(listener, app).await?;

    Ok(())
}
