use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

pub mod in_memory;
pub mod sales_history_repository;

pub use in_memory::InMemorySalesHistory;
pub use sales_history_repository::SeaOrmSalesHistory;

/// Which products a forecast covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductFilter {
    #[default]
    All,
    Only(Uuid),
}

/// Product fields the forecast reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemQuantity {
    pub quantity: i64,
}

/// Read-only access to the catalog and its sales history.
///
/// Implementations only return line items whose order counts toward sales
/// (see [`crate::entities::OrderStatus::COUNTS_TOWARD_SALES`]) and whose order
/// was created in the half-open window `[start, end)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SalesHistorySource: Send + Sync {
    async fn fetch_products(&self, filter: ProductFilter)
        -> Result<Vec<ProductSnapshot>, ServiceError>;

    async fn fetch_qualifying_line_items(
        &self,
        product_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LineItemQuantity>, ServiceError>;
}
