//! PrintLab Daemon - Main Entry Point
//!
//! Composition root: wires SQLite persistence, local file storage and
//! the notification dispatcher behind the JSON-RPC surface.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use printlab_api_rpc::{RpcServer, RpcServerConfig};
use printlab_core::application::{shutdown_channel, OutboxDispatcher};
use printlab_core::config::LabConfig;
use printlab_core::port::{HexTokenProvider, LogNotifier, SystemTimeProvider};
use printlab_infra_fs::LocalFileStore;
use printlab_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteNotificationOutbox,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.printlab/printlab.db";
const DEFAULT_UPLOAD_DIR: &str = "~/.printlab/uploads";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("PRINTLAB_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("printlab=info"))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("PrintLab v{} starting...", VERSION);

    // 2. Load configuration
    let db_path = std::env::var("PRINTLAB_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

    let upload_dir = std::env::var("PRINTLAB_UPLOAD_DIR")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_UPLOAD_DIR).into_owned());

    let rpc_port: u16 = std::env::var("PRINTLAB_RPC_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9640);

    let mut lab_config = LabConfig::default();
    if let Ok(password) = std::env::var("PRINTLAB_STAFF_PASSWORD") {
        lab_config.staff_password = password;
    }
    lab_config.public_url = std::env::var("PRINTLAB_PUBLIC_URL")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{}", rpc_port));
    let lab_config = Arc::new(lab_config);

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let clock = Arc::new(SystemTimeProvider);
    let tokens = Arc::new(HexTokenProvider);
    let job_repo = Arc::new(SqliteJobRepository::new(pool.clone(), clock.clone()));
    let outbox = Arc::new(SqliteNotificationOutbox::new(pool.clone(), clock.clone()));
    let files = Arc::new(LocalFileStore::new(upload_dir.clone()));
    let notifier = Arc::new(LogNotifier);

    info!(upload_dir = %upload_dir, "Upload storage ready");

    // 5. Start notification dispatcher
    info!("Starting notification dispatcher...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let dispatcher = OutboxDispatcher::new(outbox.clone(), notifier);
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(shutdown_rx).await;
    });

    // 6. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: rpc_port,
        ..Default::default()
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        job_repo,
        outbox,
        files,
        tokens,
        clock,
        lab_config,
    );
    let rpc_handle = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!("System ready. Waiting for print requests...");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher_handle).await;

    info!("Shutdown complete.");

    Ok(())
}
