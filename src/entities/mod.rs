//! Read-only views of the storefront tables the forecast consumes.
//! The schema itself is owned and migrated by the storefront.

pub mod order;
pub mod order_item;
pub mod product;

pub use order::{Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use product::{Entity as Product, Model as ProductModel};
