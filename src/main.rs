use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_scan_gateway::{
    ai::HttpAiGateway,
    config::Config,
    database::Database,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "food-scan-gateway")]
#[command(version)]
#[command(about = "Cached, budget-gated AI food photo analysis and family meal planning")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("food_scan_gateway={},tower_http=trace", cli.log_level)
    } else {
        format!("food_scan_gateway={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting food-scan-gateway v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    config.validate()?;

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!(
        "Database connection established ({}) and migrations applied",
        database.database_type()
    );

    let ai_gateway = Arc::new(HttpAiGateway::from_config(&config.ai_gateway)?);
    info!(
        "AI gateway configured: {} (model {})",
        config.ai_gateway.url, config.ai_gateway.model
    );

    let state = AppState::new(config, database, ai_gateway);
    let usage_recorder = state.usage_recorder.clone();

    let server = WebServer::new(state)?;
    info!("Web server starting on http://{}", server.addr());
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!(
        "Waiting for {} pending usage writes",
        usage_recorder.pending()
    );
    usage_recorder.flush().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
