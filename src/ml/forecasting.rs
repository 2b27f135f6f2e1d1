//! Average-rate demand forecasting and reorder recommendations.
//!
//! Everything in this module is a pure function of its inputs. Identical
//! inputs produce bit-identical results.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Horizon and lookback window of one forecast run, both in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastWindow {
    pub forecast_period_days: i64,
    pub lookback_period_days: i64,
}

impl ForecastWindow {
    /// Rejects non-positive periods.
    pub fn new(forecast_period_days: i64, lookback_period_days: i64) -> Result<Self, ServiceError> {
        if forecast_period_days <= 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "forecast_period_days must be positive, got {}",
                forecast_period_days
            )));
        }
        if lookback_period_days <= 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "lookback_period_days must be positive, got {}",
                lookback_period_days
            )));
        }
        Ok(Self {
            forecast_period_days,
            lookback_period_days,
        })
    }
}

/// Reorder point policy: `reorder_point = daily_rate * lead_time_days * safety_stock_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReorderPolicy {
    pub lead_time_days: f64,
    pub safety_stock_factor: f64,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self {
            lead_time_days: 7.0,
            safety_stock_factor: 1.5,
        }
    }
}

impl ReorderPolicy {
    /// Days of demand the reorder point covers.
    pub fn cover_days(&self) -> f64 {
        self.lead_time_days * self.safety_stock_factor
    }

    pub fn reorder_point(&self, daily_average_sales: f64) -> f64 {
        daily_average_sales * self.cover_days()
    }
}

/// Per-product forecast record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub product_id: Uuid,
    pub product_name: String,
    pub current_stock: i64,
    pub daily_average_sales: f64,
    pub forecasted_demand: f64,
    /// `None` when nothing sold in the lookback window
    pub projected_stockout_days: Option<f64>,
    pub reorder_point: f64,
    pub needs_reorder: bool,
    pub recommended_order_quantity: f64,
}

/// Computes the forecast for one product from its units sold in the lookback window.
pub fn forecast_product(
    product_id: Uuid,
    product_name: &str,
    current_stock: i64,
    total_units_sold: i64,
    window: ForecastWindow,
    policy: &ReorderPolicy,
) -> ForecastResult {
    let daily_average_sales = total_units_sold as f64 / window.lookback_period_days as f64;
    let forecasted_demand = daily_average_sales * window.forecast_period_days as f64;
    let stock = current_stock as f64;

    let projected_stockout_days = if daily_average_sales > 0.0 {
        Some(stock / daily_average_sales)
    } else {
        None
    };

    let reorder_point = policy.reorder_point(daily_average_sales);
    let needs_reorder = stock <= reorder_point;
    let recommended_order_quantity = (forecasted_demand + reorder_point - stock).max(0.0);

    ForecastResult {
        product_id,
        product_name: product_name.to_string(),
        current_stock,
        daily_average_sales,
        forecasted_demand,
        projected_stockout_days,
        reorder_point,
        needs_reorder,
        recommended_order_quantity,
    }
}

/// Presentation order: reorder-needed first, then soonest stockout (unbounded last),
/// then product name, then id.
pub fn by_urgency(a: &ForecastResult, b: &ForecastResult) -> Ordering {
    b.needs_reorder
        .cmp(&a.needs_reorder)
        .then_with(|| match (a.projected_stockout_days, b.projected_stockout_days) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.product_name.cmp(&b.product_name))
        .then_with(|| a.product_id.cmp(&b.product_id))
}

pub fn sort_by_urgency(results: &mut [ForecastResult]) {
    results.sort_by(by_urgency);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn window(forecast: i64, lookback: i64) -> ForecastWindow {
        ForecastWindow::new(forecast, lookback).unwrap()
    }

    fn product(stock: i64, sold: i64) -> ForecastResult {
        forecast_product(
            Uuid::nil(),
            "Oat Milk Soap",
            stock,
            sold,
            window(30, 30),
            &ReorderPolicy::default(),
        )
    }

    #[test]
    fn steady_seller_projects_linearly() {
        let result = product(100, 30);
        assert_eq!(result.daily_average_sales, 1.0);
        assert_eq!(result.forecasted_demand, 30.0);
        assert_eq!(result.projected_stockout_days, Some(100.0));
        assert_eq!(result.reorder_point, 10.5);
        assert!(!result.needs_reorder);
        assert_eq!(result.recommended_order_quantity, 0.0);
    }

    #[test]
    fn zero_sales_has_no_stockout_projection() {
        let result = product(5, 0);
        assert_eq!(result.daily_average_sales, 0.0);
        assert_eq!(result.forecasted_demand, 0.0);
        assert_eq!(result.projected_stockout_days, None);
        assert_eq!(result.reorder_point, 0.0);
        assert!(!result.needs_reorder);
        assert_eq!(result.recommended_order_quantity, 0.0);
    }

    #[test]
    fn empty_shelf_with_zero_sales_still_needs_reorder() {
        let result = product(0, 0);
        assert_eq!(result.reorder_point, 0.0);
        assert!(result.needs_reorder);
        assert_eq!(result.recommended_order_quantity, 0.0);
    }

    #[test]
    fn stock_equal_to_reorder_point_needs_reorder() {
        // 60 units over 30 days = 2/day, reorder point 21
        let at_boundary = product(21, 60);
        assert_eq!(at_boundary.reorder_point, 21.0);
        assert!(at_boundary.needs_reorder);

        let above_boundary = product(22, 60);
        assert!(!above_boundary.needs_reorder);
    }

    #[test]
    fn recommended_quantity_covers_demand_plus_reorder_point() {
        // 2/day: demand 60, reorder point 21, stock 10 -> 71
        let result = product(10, 60);
        assert!(result.needs_reorder);
        assert_eq!(result.recommended_order_quantity, 71.0);
    }

    #[test]
    fn lookback_longer_than_horizon_averages_over_lookback() {
        let result = forecast_product(
            Uuid::nil(),
            "Cedar Candle",
            40,
            90,
            window(14, 90),
            &ReorderPolicy::default(),
        );
        assert_eq!(result.daily_average_sales, 1.0);
        assert_eq!(result.forecasted_demand, 14.0);
        assert_eq!(result.projected_stockout_days, Some(40.0));
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let a = forecast_product(Uuid::nil(), "Tea", 17, 7, window(45, 30), &ReorderPolicy::default());
        let b = forecast_product(Uuid::nil(), "Tea", 17, 7, window(45, 30), &ReorderPolicy::default());
        assert_eq!(a, b);
        assert_eq!(a.daily_average_sales.to_bits(), b.daily_average_sales.to_bits());
        assert_eq!(a.recommended_order_quantity.to_bits(), b.recommended_order_quantity.to_bits());
    }

    #[rstest]
    #[case(0, 30)]
    #[case(-5, 30)]
    #[case(30, 0)]
    #[case(30, -1)]
    fn non_positive_periods_are_invalid(#[case] forecast: i64, #[case] lookback: i64) {
        assert!(matches!(
            ForecastWindow::new(forecast, lookback),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn urgency_order_puts_reorders_first_and_unbounded_last() {
        let mut results = vec![
            forecast_product(Uuid::from_u128(1), "Idle", 50, 0, window(30, 30), &ReorderPolicy::default()),
            forecast_product(Uuid::from_u128(2), "Slow", 100, 30, window(30, 30), &ReorderPolicy::default()),
            forecast_product(Uuid::from_u128(3), "Low", 5, 30, window(30, 30), &ReorderPolicy::default()),
            forecast_product(Uuid::from_u128(4), "Fast", 100, 90, window(30, 30), &ReorderPolicy::default()),
        ];
        sort_by_urgency(&mut results);

        let names: Vec<_> = results.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["Low", "Fast", "Slow", "Idle"]);
    }

    #[test]
    fn serializes_with_camel_case_fields_and_null_stockout() {
        let value = serde_json::to_value(product(5, 0)).unwrap();
        assert_eq!(value["currentStock"], 5);
        assert!(value["projectedStockoutDays"].is_null());
        assert_eq!(value["needsReorder"], false);
        assert!(value.get("recommendedOrderQuantity").is_some());
    }
}
