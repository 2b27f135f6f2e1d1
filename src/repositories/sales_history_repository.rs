use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use super::{LineItemQuantity, ProductFilter, ProductSnapshot, SalesHistorySource};
use crate::entities::{order, order_item, product, OrderStatus};
use crate::errors::ServiceError;

/// Sales history backed by the storefront database
#[derive(Debug, Clone)]
pub struct SeaOrmSalesHistory {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSalesHistory {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SalesHistorySource for SeaOrmSalesHistory {
    async fn fetch_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductSnapshot>, ServiceError> {
        let mut query = product::Entity::find().order_by_asc(product::Column::Name);
        if let ProductFilter::Only(id) = filter {
            query = query.filter(product::Column::Id.eq(id));
        }

        let products = query.all(&*self.db).await.map_err(|e| {
            error!(error = %e, "Database error when fetching products");
            ServiceError::data_unavailable("failed to fetch products", e)
        })?;

        debug!(count = products.len(), "Fetched products for forecast");

        Ok(products
            .into_iter()
            .map(|p| ProductSnapshot {
                id: p.id,
                name: p.name,
                stock_quantity: i64::from(p.stock_quantity),
            })
            .collect())
    }

    async fn fetch_qualifying_line_items(
        &self,
        product_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LineItemQuantity>, ServiceError> {
        let quantities: Vec<i32> = order_item::Entity::find()
            .select_only()
            .column(order_item::Column::Quantity)
            .join(JoinType::InnerJoin, order_item::Relation::Order.def())
            .filter(order_item::Column::ProductId.eq(product_id))
            .filter(order::Column::Status.is_in(OrderStatus::COUNTS_TOWARD_SALES))
            .filter(order::Column::CreatedAt.gte(start))
            .filter(order::Column::CreatedAt.lt(end))
            .into_tuple()
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(product_id = %product_id, error = %e, "Database error when fetching line items");
                ServiceError::data_unavailable("failed to fetch order line items", e)
            })?;

        Ok(quantities
            .into_iter()
            .map(|quantity| LineItemQuantity {
                quantity: i64::from(quantity),
            })
            .collect())
    }
}
