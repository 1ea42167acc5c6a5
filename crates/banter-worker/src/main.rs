//! Polling worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use banter_store::RedisJobStore;
use banter_worker::{production_orchestrator, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("banter=info".parse().unwrap())
        .add_directive("aws_config=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting banter-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let store = match RedisJobStore::from_env() {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to connect to job store: {}", e);
            std::process::exit(1);
        }
    };

    let orchestrator = match production_orchestrator(store, &config) {
        Ok(o) => o,
        Err(e) => {
            error!("Failed to build pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let mut shutdown = Box::pin(tokio::signal::ctrl_c());
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
            result = orchestrator.run_once() => {
                match result {
                    Ok(Some(id)) => info!(job_id = %id, "Job finished, polling again"),
                    Ok(None) => tokio::time::sleep(config.poll_interval).await,
                    Err(e) => {
                        error!("Claim failed: {}", e);
                        tokio::time::sleep(config.poll_interval).await;
                    }
                }
            }
        }
    }

    info!("Worker shutdown complete");
}
