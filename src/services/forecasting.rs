use chrono::{DateTime, Duration, Utc};
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::ForecastConfig,
    errors::ServiceError,
    ml::forecasting::{forecast_product, sort_by_urgency, ForecastResult, ForecastWindow, ReorderPolicy},
    repositories::{ProductFilter, SalesHistorySource},
};

/// Parameters of a GetInventoryForecast call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryForecastQuery {
    /// Forecast horizon in days; the configured default (30) when absent
    pub forecast_period_days: Option<i64>,
    /// Restrict the forecast to a single product
    pub product_id: Option<Uuid>,
}

/// Forecast response: the per-product records plus the echoed parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryForecast {
    pub forecast_period_days: i64,
    pub lookback_period_days: i64,
    pub forecasts: Vec<ForecastResult>,
}

impl InventoryForecast {
    pub fn reorder_candidates(&self) -> impl Iterator<Item = &ForecastResult> {
        self.forecasts.iter().filter(|f| f.needs_reorder)
    }
}

/// Computes inventory forecasts over a sales history source
#[derive(Clone)]
pub struct ForecastService {
    source: Arc<dyn SalesHistorySource>,
    policy: ReorderPolicy,
    lookback_period_days: i64,
    default_forecast_period_days: i64,
}

impl ForecastService {
    pub fn new(source: Arc<dyn SalesHistorySource>, config: &ForecastConfig) -> Self {
        Self {
            source,
            policy: config.reorder_policy(),
            lookback_period_days: config.lookback_period_days,
            default_forecast_period_days: config.default_forecast_period_days,
        }
    }

    /// Forecast as of now
    pub async fn get_inventory_forecast(
        &self,
        query: InventoryForecastQuery,
    ) -> Result<InventoryForecast, ServiceError> {
        self.get_inventory_forecast_as_of(query, Utc::now()).await
    }

    /// Forecast over the lookback window ending at `as_of` (exclusive)
    #[instrument(skip(self), fields(lookback_period_days = self.lookback_period_days))]
    pub async fn get_inventory_forecast_as_of(
        &self,
        query: InventoryForecastQuery,
        as_of: DateTime<Utc>,
    ) -> Result<InventoryForecast, ServiceError> {
        let started = Instant::now();
        let forecast_period_days = query
            .forecast_period_days
            .unwrap_or(self.default_forecast_period_days);
        let window = ForecastWindow::new(forecast_period_days, self.lookback_period_days)?;

        let result = self.compute(window, query.product_id, as_of).await;

        histogram!("storefront_forecast.duration", started.elapsed().as_secs_f64());
        match &result {
            Ok(forecast) => {
                counter!("storefront_forecast.runs", 1);
                gauge!("storefront_forecast.products", forecast.forecasts.len() as f64);
                info!(
                    products = forecast.forecasts.len(),
                    flagged = forecast.reorder_candidates().count(),
                    "Inventory forecast computed"
                );
            }
            Err(e) => {
                counter!("storefront_forecast.errors", 1);
                warn!(error = %e, "Inventory forecast failed");
            }
        }

        result
    }

    async fn compute(
        &self,
        window: ForecastWindow,
        product_id: Option<Uuid>,
        as_of: DateTime<Utc>,
    ) -> Result<InventoryForecast, ServiceError> {
        let start = Duration::try_days(window.lookback_period_days)
            .and_then(|lookback| as_of.checked_sub_signed(lookback))
            .ok_or_else(|| {
                ServiceError::InvalidArgument(format!(
                    "lookback_period_days {} reaches past the earliest representable date",
                    window.lookback_period_days
                ))
            })?;

        let filter = product_id.map_or(ProductFilter::All, ProductFilter::Only);
        let products = self.source.fetch_products(filter).await?;

        if let Some(id) = product_id {
            if products.is_empty() {
                return Err(ServiceError::NotFound(format!("Product {} not found", id)));
            }
        }

        let mut forecasts = Vec::with_capacity(products.len());

        for product in products {
            let items = self
                .source
                .fetch_qualifying_line_items(product.id, start, as_of)
                .await?;

            let mut total_units_sold: i64 = 0;
            for item in items {
                if item.quantity > 0 {
                    total_units_sold += item.quantity;
                } else {
                    warn!(product_id = %product.id, quantity = item.quantity, "Ignoring non-positive line item quantity");
                }
            }

            let current_stock = if product.stock_quantity < 0 {
                warn!(product_id = %product.id, stock = product.stock_quantity, "Negative stock treated as zero");
                0
            } else {
                product.stock_quantity
            };

            forecasts.push(forecast_product(
                product.id,
                &product.name,
                current_stock,
                total_units_sold,
                window,
                &self.policy,
            ));
        }

        sort_by_urgency(&mut forecasts);

        Ok(InventoryForecast {
            forecast_period_days: window.forecast_period_days,
            lookback_period_days: window.lookback_period_days,
            forecasts,
        })
    }
}
