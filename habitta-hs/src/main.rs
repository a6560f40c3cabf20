//! habitta-hs (Home Systems) - Evidence ingestion and prediction service
//!
//! Maintains canonical system records per home, resolves multi-source
//! evidence under the update authority model, and serves lifecycle
//! predictions, the home outlook, and maintenance alerts.

use anyhow::Result;
use clap::Parser;
use habitta_common::config::{RootFolderInitializer, RootFolderResolver};
use habitta_common::params::PARAMS;
use habitta_hs::{build_router, AppState};
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "habitta-hs", about = "Habitta home systems service")]
struct Args {
    /// Data root folder (overrides environment and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Listen port
    #[arg(long, default_value_t = 5740)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Habitta Home Systems (habitta-hs) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let resolver =
        RootFolderResolver::new("home-systems").with_cli_override(args.root_folder.as_deref());
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = habitta_common::db::init_database(&db_path).await?;

    // Seed and load runtime parameters from the settings table
    habitta_common::params::GlobalParams::seed_missing(&pool).await?;
    PARAMS.init_from_database(&pool).await?;

    // Create application state and router
    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("habitta-hs listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
