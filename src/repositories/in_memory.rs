use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use super::{LineItemQuantity, ProductFilter, ProductSnapshot, SalesHistorySource};
use crate::entities::OrderStatus;
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
struct OrderRecord {
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct LineRecord {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
}

/// Snapshot of catalog and order history held in memory.
///
/// Applies the same status and window rules as [`super::SeaOrmSalesHistory`];
/// used by tests and offline fixtures.
#[derive(Debug, Clone, Default)]
pub struct InMemorySalesHistory {
    products: Vec<ProductSnapshot>,
    orders: HashMap<Uuid, OrderRecord>,
    lines: Vec<LineRecord>,
}

impl InMemorySalesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, name: &str, stock_quantity: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.products.push(ProductSnapshot {
            id,
            name: name.to_string(),
            stock_quantity,
        });
        id
    }

    /// Records an order with one line per `(product_id, quantity)` pair.
    pub fn add_order(
        &mut self,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        lines: &[(Uuid, i64)],
    ) -> Uuid {
        let order_id = Uuid::new_v4();
        self.orders.insert(order_id, OrderRecord { status, created_at });
        self.lines
            .extend(lines.iter().map(|&(product_id, quantity)| LineRecord {
                order_id,
                product_id,
                quantity,
            }));
        order_id
    }
}

#[async_trait]
impl SalesHistorySource for InMemorySalesHistory {
    async fn fetch_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductSnapshot>, ServiceError> {
        let mut products: Vec<_> = self
            .products
            .iter()
            .filter(|p| match filter {
                ProductFilter::All => true,
                ProductFilter::Only(id) => p.id == id,
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn fetch_qualifying_line_items(
        &self,
        product_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LineItemQuantity>, ServiceError> {
        Ok(self
            .lines
            .iter()
            .filter(|line| line.product_id == product_id)
            .filter(|line| {
                self.orders.get(&line.order_id).is_some_and(|order| {
                    order.status.counts_toward_sales()
                        && order.created_at >= start
                        && order.created_at < end
                })
            })
            .map(|line| LineItemQuantity {
                quantity: line.quantity,
            })
            .collect())
    }
}
