// Business logic services
pub mod forecasting;

pub use forecasting::{ForecastService, InventoryForecast, InventoryForecastQuery};
