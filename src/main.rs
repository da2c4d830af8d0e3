// Page Info Service
// Resolves Facebook page branding (name, picture) for ad creative previews

mod api;
mod error;
mod features;
mod models;
mod routes;
mod utils;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::features::audit_log::AuditLog;
use crate::features::resolver::PageInfoResolver;
use crate::routes::AppState;
use crate::utils::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "pageinfo_rs=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env());
    info!(
        "Starting page info service ({:?}, logs in {})",
        config.environment,
        config.log_dir.display()
    );

    let resolver = PageInfoResolver::new(config.clone()).context("Failed to create HTTP clients")?;
    let (audit, audit_writer) = AuditLog::spawn(&config.log_dir, config.audit_queue_capacity);

    let app = routes::router(AppState {
        resolver: Arc::new(resolver),
        audit,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutting down...");
        })
        .await?;

    // Router (and its audit handles) is gone; let the writer flush
    if tokio::time::timeout(Duration::from_secs(5), audit_writer)
        .await
        .is_err()
    {
        warn!("Audit writer did not finish in time");
    }

    info!("Goodbye!");
    Ok(())
}
