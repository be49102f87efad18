//! Comment Votes Reconciler
//!
//! Applies pending migrations, then periodically replays the counter deltas
//! that failed after their vote had committed.

use comment_votes::{AppError, Dependencies, LogFormat, Settings};
use comment_votes_repository::postgres::run_migrations;
use dotenv::dotenv;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("comment_votes=info,comment_votes_pipeline=info,comment_votes_repository=info")
    });

    let init = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init(),
    };
    init.map_err(|e| AppError::Tracing(e.to_string()))?;

    info!(
        service_name = "comment-votes-reconciler",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format)?;

    info!("Starting comment votes reconciler");

    let deps = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    run_migrations(&deps.pool).await?;
    info!("Migrations applied");

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    deps.reconciler.run(settings.reconcile_interval, shutdown_rx).await;
    deps.pool.close().await;

    info!("Comment votes reconciler stopped");
    Ok(())
}
