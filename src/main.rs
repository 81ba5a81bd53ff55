//! Chatdesk - landing-page chatbot backend
//! Serves registration/login, bearer-token protected document upload and a scripted chat API.

use anyhow::{Context, Result};
use chatdesk_backend::{build_router, AppState, Config};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line overrides; everything else comes from the environment.
#[derive(Debug, Parser)]
#[command(name = "chatdesk", version, about = "Chatdesk API server")]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long)]
    database_path: Option<String>,

    /// Create the demo/demo123 account at startup. Development only.
    #[arg(long)]
    seed_demo: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.database_path {
            config.database_path = path;
        }
        if self.seed_demo {
            config.seed_demo_user = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Invalid configuration")?;
    cli.apply(&mut config);
    config.warn_if_insecure();

    info!("🚀 Chatdesk starting");

    let state = AppState::new(&config)?;
    if config.seed_demo_user {
        state.seed_demo_account()?;
    }

    info!(
        "🔐 Tokens: {:?}, {}h lifetime",
        config.jwt_algorithm, config.token_expire_hours
    );
    info!("📁 Uploads stored in: {}", config.upload_dir.display());

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Chatdesk stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatdesk=debug,chatdesk_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also the crate root, for runs started from elsewhere with --manifest-path
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
