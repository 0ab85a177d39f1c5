//! # Kennel - Pet registry HTTP service
//!
//! This is the main entry point that wires everything together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Dependency Injection & Wiring           │
//! │    │                                                            │
//! │    ├── Loads: ServerConfig (shared), CLI flags win             │
//! │    ├── Creates: PetService on the configured store (adapter)   │
//! │    ├── Creates: axum Router (adapter)                          │
//! │    └── Runs: HTTP server until Ctrl-C                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kennel_adapter::controller::{router, AppState};
use kennel_adapter::repository::open_pet_service;
use shared::{ServerConfig, StorageConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kennel")]
#[command(about = "Kennel - pets, groups and traits over HTTP")]
#[command(version)]
struct Cli {
    /// JSON config file (kennel.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,

    /// Base URL used in pagination links
    #[arg(long)]
    public_url: Option<String>,

    #[arg(long)]
    page_size: Option<usize>,

    /// Persist to this SQLite file instead of memory
    #[arg(long)]
    sqlite: Option<PathBuf>,
}

impl Cli {
    /// File config (or defaults) with flags applied on top
    fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.bind_addr = bind.clone();
        }
        if let Some(url) = &self.public_url {
            config.public_url = url.clone();
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        if let Some(path) = &self.sqlite {
            config.storage = StorageConfig::Sqlite { path: path.clone() };
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.server_config()?;

    // ========================================
    // Dependency Injection - Wire up the system
    // ========================================

    let service = open_pet_service(&config.storage, config.page_size)?;
    let state = AppState::new(service, config.base_url())
        .with_context(|| format!("invalid publicUrl: {}", config.public_url))?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        addr = %config.bind_addr,
        public_url = %config.base_url(),
        page_size = config.page_size,
        storage = ?config.storage,
        "kennel listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("kennel stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
