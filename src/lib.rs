//! Storefront Forecast Library
//!
//! Inventory demand forecasting and reorder recommendations for the
//! storefront admin backend.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod ml;
pub mod repositories;
pub mod scheduler;
pub mod services;

pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ml::forecasting::{ForecastResult, ForecastWindow, ReorderPolicy};
    pub use crate::repositories::{
        InMemorySalesHistory, ProductFilter, SalesHistorySource, SeaOrmSalesHistory,
    };
    pub use crate::services::forecasting::{
        ForecastService, InventoryForecast, InventoryForecastQuery,
    };
}
