use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::{
    signal,
    sync::{mpsc, watch},
};
use tracing::{error, info, warn};

use storefront_forecast as forecast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = forecast::config::load_config().context("failed to load configuration")?;
    forecast::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Init DB
    let db_pool = forecast::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the storefront database")?;
    forecast::db::check_connection(&db_pool)
        .await
        .context("storefront database did not answer")?;
    let db_arc = Arc::new(db_pool);

    // Init events
    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = forecast::events::EventSender::new(event_tx);
    let event_task = tokio::spawn(forecast::events::process_events(event_rx));

    let source = Arc::new(forecast::repositories::SeaOrmSalesHistory::new(db_arc.clone()));
    let service = forecast::services::ForecastService::new(source, &cfg.forecast);
    let scheduler = forecast::scheduler::ForecastScheduler::new(
        service,
        event_sender,
        cfg.forecast.check_interval(),
    );

    if !cfg.forecast.check_enabled {
        info!("Recurring inventory check disabled; running a single check");
        let report = scheduler.run_once(Utc::now()).await;
        drop(scheduler);
        let _ = event_task.await;
        close_db(db_arc).await?;
        report.context("inventory check failed")?;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    info!("storefront-forecast running; press Ctrl+C to stop");
    shutdown_signal().await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task ended abnormally: {}", e);
    }
    let _ = event_task.await;

    close_db(db_arc).await?;

    Ok(())
}

async fn close_db(db: Arc<forecast::db::DbPool>) -> anyhow::Result<()> {
    match Arc::try_unwrap(db) {
        Ok(pool) => forecast::db::close_pool(pool).await?,
        Err(_) => warn!("Database pool still shared at shutdown; leaving it to drop"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
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
}
