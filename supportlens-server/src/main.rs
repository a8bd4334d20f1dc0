use std::sync::Arc;

use clap::Parser;
use supportlens_core::{AnthropicClient, AnthropicConfig, CompletionBackend, SupportLensConfig};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use supportlens_server::{http, seed};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "supportlens.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience; production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match SupportLensConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Connect to DB
    let pool = match supportlens_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match supportlens_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ SupportLens DB health check passed");
        return Ok(());
    }

    // Schema, then sample data for fresh installs
    supportlens_core::store::init_schema(&pool).await?;
    if config.seed.enabled {
        if let Err(e) = seed::seed(&pool, &config.seed).await {
            tracing::warn!(error = %e, "Seeding failed, continuing with the store as-is");
        }
    }

    // Completion backend, shared by chat and classification
    let backend: Arc<dyn CompletionBackend> = match AnthropicClient::new(AnthropicConfig::new(
        None,
        config.completion.model.clone(),
    )) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to create completion backend: {} (set ANTHROPIC_API_KEY)", e);
            std::process::exit(1);
        }
    };
    tracing::info!(backend = backend.name(), model = %config.completion.model, "Completion backend ready");

    // Graceful shutdown on Ctrl+C
    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(pool, config, backend, tx.subscribe()).await?;

    Ok(())
}
