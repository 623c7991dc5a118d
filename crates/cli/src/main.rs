use std::sync::Arc;

use anyhow::{Context, Result};
use checkflow_http::{create_router, AppState};
use checkflow_storage::traits::Store;
use checkflow_storage::PgStorage;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "checkflow")]
#[command(about = "Decision-support backend for hierarchical checklists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(short, long, default_value = "8350")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Apply database migrations and exit
    Migrate,
}

fn database_url() -> Result<String> {
    std::env::var("DATABASE_URL").context("DATABASE_URL environment variable must be set")
}

async fn connect() -> Result<PgStorage> {
    Ok(PgStorage::new(&database_url()?).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Commands::Serve { port, host } => {
            let store: Arc<dyn Store> = Arc::new(connect().await?);
            let router = create_router(Arc::new(AppState::new(store)));
            let addr = format!("{host}:{port}");
            tracing::info!("listening on {addr}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, router).await?;
        },
        Commands::Migrate => {
            // PgStorage::new runs the idempotent migrations on connect.
            connect().await?;
            tracing::info!("migrations applied");
        },
    }

    Ok(())
}
