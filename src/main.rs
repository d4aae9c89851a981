mod api;
mod config;
mod search;
mod seed;
mod storage;


use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Config, IndexBackend};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use search::SearchRequest;
use storage::{memory::MemoryIndex, sqlite::SqliteIndex, MessageIndex};

/// Full-text search over indexed mail
#[derive(Debug, Parser)]
#[command(name = "mailsearch", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP search API (default)
    Serve,
    /// Run one search and print hits as JSON lines
    Search {
        /// Owner whose messages are searched
        #[arg(long, env = "SEARCH_OWNER")]
        owner: String,
        /// Restrict to one mailbox
        #[arg(long)]
        mailbox: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<f64>,
        /// Query in FTS5 match syntax
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration from .env and environment
    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  API Port: {}", config.api_port);
    info!("  Index backend: {:?}", config.index_backend);
    info!("  Database: {}", config.database_url);
    info!("  Search timeout: {:?}", config.search_timeout);
    info!("  Seed demo data: {}", config.seed_demo_data);

    let index = open_index(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, index).await,
        Command::Search {
            owner,
            mailbox,
            limit,
            offset,
            query,
        } => {
            let mut request = SearchRequest::new(owner, query);
            if let Some(mailbox) = mailbox {
                request = request.with_mailbox(mailbox);
            }
            if let Some(limit) = limit {
                request = request.with_limit(limit);
            }
            if let Some(offset) = offset {
                request = request.with_offset(offset);
            }
            let hits = search::search(index.as_ref(), request).await?;
            for hit in hits {
                println!("{}", serde_json::to_string(&hit)?);
            }
            index.close().await;
            Ok(())
        }
    }
}

/// Open the configured index, seeding demo data when enabled
async fn open_index(config: &Config) -> Result<Arc<dyn MessageIndex>> {
    info!("Initializing {:?} index...", config.index_backend);
    if config.index_backend.is_demo_only() {
        warn!(
            "{:?} index is for demos and tests only: nothing is persisted and FTS5 operators are not supported",
            config.index_backend
        );
    }

    let index: Arc<dyn MessageIndex> = match config.index_backend {
        IndexBackend::Sqlite => {
            let index = SqliteIndex::new(&config.database_url).await?;
            if config.seed_demo_data {
                seed::seed_demo_data(&index).await?;
            }
            Arc::new(index)
        }
        IndexBackend::Memory => {
            let index = MemoryIndex::new();
            if config.seed_demo_data {
                seed::seed_demo_data(&index).await?;
            }
            Arc::new(index)
        }
    };

    info!("Index initialized");
    Ok(index)
}

async fn serve(config: Config, index: Arc<dyn MessageIndex>) -> Result<()> {
    let router = api::create_router(index.clone(), config.search_timeout);

    // Set up graceful shutdown signal handling
    let shutdown_signal = async {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C signal");
            },
            _ = terminate => {
                info!("Received terminate signal");
            },
        }
    };

    info!("Search API available at: http://localhost:{}/api/search", config.api_port);

    match api::start_server_with_shutdown(router, config.api_port, shutdown_signal).await {
        Ok(_) => {
            index.close().await;
            info!("Server shutdown completed gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Server error: {}", e);
            Err(e)
        }
    }
}
