//! Coreport Server: application entry point.

use coreport_db::DbManager;
use coreport_server::logging::init_logging;
use coreport_server::settings::Settings;
use coreport_server::{AppState, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::load()?;
    init_logging(&settings.log_level, &settings.log_format)?;

    let db = DbManager::connect(&settings.db).await?;
    let applied = coreport_db::run_migrations(db.client()).await?;
    tracing::info!(applied, "schema up to date");

    let app = router(AppState::new(db.client().clone(), settings.links.clone()));
    let addr = settings.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "coreport-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("coreport-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
