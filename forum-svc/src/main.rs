//! forum-svc - course team and discussion service
//!
//! Configuration priority: command line / environment > TOML file > defaults.

use anyhow::{Context, Result};
use clap::Parser;
use forum_common::config::{ConfigOverrides, ServiceConfig};
use forum_common::db::init_database;
use forum_svc::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "forum-svc")]
#[command(about = "Course team and discussion service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "FORUM_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "FORUM_BIND_ADDR")]
    bind: Option<String>,

    /// SQLite database path
    #[arg(short, long, env = "FORUM_DATABASE")]
    database: Option<PathBuf>,

    /// Base URL of the discussions micro-frontend
    #[arg(long, env = "FORUM_DISCUSSIONS_MFE_URL")]
    discussions_mfe_url: Option<String>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, env = "FORUM_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServiceConfig::resolve(ConfigOverrides {
        config_file: args.config,
        bind_addr: args.bind,
        database_path: args.database,
        discussions_mfe_url: args.discussions_mfe_url,
        log_level: args.log_level,
    })
    .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting forum-svc v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", config.database_path.display());
    info!("Discussions MFE: {}", config.discussions_mfe_url);

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, &config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("forum-svc listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
