//! Recurring inventory check.
//!
//! Calls [`ForecastService`] on a timer and publishes a reorder alert per
//! flagged product. The forecast itself knows nothing about scheduling.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    services::forecasting::{ForecastService, InventoryForecastQuery},
};

/// Outcome of one inventory check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryCheckReport {
    pub checked: usize,
    pub flagged: usize,
    pub as_of: DateTime<Utc>,
}

pub struct ForecastScheduler {
    service: ForecastService,
    event_sender: EventSender,
    interval: Duration,
}

impl ForecastScheduler {
    pub fn new(service: ForecastService, event_sender: EventSender, interval: Duration) -> Self {
        Self {
            service,
            event_sender,
            interval,
        }
    }

    /// Runs one inventory check over the whole catalog using the default horizon.
    #[instrument(skip(self))]
    pub async fn run_once(&self, as_of: DateTime<Utc>) -> Result<InventoryCheckReport, ServiceError> {
        let forecast = match self
            .service
            .get_inventory_forecast_as_of(InventoryForecastQuery::default(), as_of)
            .await
        {
            Ok(forecast) => forecast,
            Err(e) => {
                // The forecast error wins over a failed publish
                if let Err(publish_err) = self
                    .publish(Event::InventoryCheckFailed {
                        reason: e.to_string(),
                        as_of,
                    })
                    .await
                {
                    error!(error = %publish_err, "Could not publish inventory check failure");
                }
                return Err(e);
            }
        };

        let mut flagged = 0;
        for result in forecast.reorder_candidates() {
            flagged += 1;
            self.publish(Event::ReorderRecommended {
                product_id: result.product_id,
                product_name: result.product_name.clone(),
                current_stock: result.current_stock,
                reorder_point: result.reorder_point,
                recommended_order_quantity: result.recommended_order_quantity,
                projected_stockout_days: result.projected_stockout_days,
            })
            .await?;
        }
        counter!("storefront_forecast.reorder_flagged", flagged as u64);

        let report = InventoryCheckReport {
            checked: forecast.forecasts.len(),
            flagged,
            as_of,
        };
        self.publish(Event::InventoryCheckCompleted {
            checked: report.checked,
            flagged: report.flagged,
            as_of,
        })
        .await?;

        Ok(report)
    }

    /// Ticks until `shutdown` turns true. The first check runs immediately.
    /// A failed check is logged and the loop keeps going.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Starting inventory check scheduler");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(report) => info!(checked = report.checked, flagged = report.flagged, "Inventory check finished"),
                        Err(e) => error!(error = %e, "Inventory check failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Inventory check scheduler stopped");
    }

    async fn publish(&self, event: Event) -> Result<(), ServiceError> {
        self.event_sender
            .send(event)
            .await
            .map_err(ServiceError::EventError)
    }
}
