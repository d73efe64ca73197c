//! Domain events
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate", content = "event")]
pub enum DomainEvent {
    Catalog(CatalogEvent),
    Order(OrderEvent),
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        match self {
            Self::Catalog(e) => format!("storefront.catalog.{}", e.name()),
            Self::Order(e) => format!("storefront.order.{}", e.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    ProductAdded { product_id: String },
    ProductUpdated { product_id: String },
    ProductDeleted { product_id: String },
    PricesUpdated { count: usize },
    StockUpdated { in_stock: bool, count: usize },
    Reset { total: usize },
}

impl CatalogEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::ProductAdded { .. } => "product_added",
            Self::ProductUpdated { .. } => "product_updated",
            Self::ProductDeleted { .. } => "product_deleted",
            Self::PricesUpdated { .. } => "prices_updated",
            Self::StockUpdated { .. } => "stock_updated",
            Self::Reset { .. } => "reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, total: Decimal },
    Cancelled { order_id: Uuid },
}

impl OrderEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "placed",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}
