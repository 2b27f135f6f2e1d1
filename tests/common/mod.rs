use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, Schema, Set, Statement,
};
use storefront_forecast::{
    config::ForecastConfig,
    db::{self, DbConfig},
    entities::{order, order_item, product, OrderStatus},
    repositories::SeaOrmSalesHistory,
    services::ForecastService,
};
use uuid::Uuid;

/// Storefront tables in an in-memory SQLite database.
pub struct TestDb {
    pub db: Arc<DatabaseConnection>,
}

impl TestDb {
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory database
        let pool = db::establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("failed to create test database");

        let backend = pool.get_database_backend();
        let schema = Schema::new(backend);
        let tables = [
            schema.create_table_from_entity(product::Entity),
            schema.create_table_from_entity(order::Entity),
            schema.create_table_from_entity(order_item::Entity),
        ];
        for table in tables {
            pool.execute(backend.build(&table))
                .await
                .expect("failed to create table");
        }

        Self { db: Arc::new(pool) }
    }

    pub fn service(&self) -> ForecastService {
        self.service_with(&ForecastConfig::default())
    }

    pub fn service_with(&self, config: &ForecastConfig) -> ForecastService {
        ForecastService::new(Arc::new(SeaOrmSalesHistory::new(self.db.clone())), config)
    }

    pub async fn insert_product(&self, name: &str, stock_quantity: i32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        product::Entity::insert(product::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            stock_quantity: Set(stock_quantity),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .exec(&*self.db)
        .await
        .expect("failed to insert product");
        id
    }

    pub async fn insert_order(
        &self,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        lines: &[(Uuid, i32)],
    ) -> Uuid {
        let order_id = Uuid::new_v4();
        order::Entity::insert(order::ActiveModel {
            id: Set(order_id),
            order_number: Set(format!("ORD-{}", &order_id.simple().to_string()[..8])),
            status: Set(status),
            created_at: Set(created_at),
        })
        .exec(&*self.db)
        .await
        .expect("failed to insert order");

        for &(product_id, quantity) in lines {
            order_item::Entity::insert(order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                created_at: Set(created_at),
            })
            .exec(&*self.db)
            .await
            .expect("failed to insert order item");
        }

        order_id
    }

    pub async fn drop_table(&self, table: &str) {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                format!("DROP TABLE {table};"),
            ))
            .await
            .expect("failed to drop table");
    }
}
