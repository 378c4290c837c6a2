use fieldtrack_api::{background::scheduler::BackgroundScheduler, build_router, AppState, Config};
use fieldtrack_core::{FieldService, SqliteEventStore, SystemClock};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldtrack_api=debug,fieldtrack_core=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting FieldTrack API server...");

    let config = Arc::new(Config::from_env()?);
    info!("Configuration loaded");

    let store = SqliteEventStore::open(&config.database_path)?;
    info!("Event store ready at {}", config.database_path.display());

    let service = FieldService::new(Arc::new(store), Arc::new(SystemClock));

    let scheduler = BackgroundScheduler::new(service.clone(), config.clone()).await?;

    let app = build_router(AppState::new(service));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutting down gracefully...");
            scheduler.shutdown().await;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
