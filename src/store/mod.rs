//! Session persistence: carts, wishlists, the edited catalog and placed orders.

mod locks;
mod memory;
mod postgres;

pub use locks::SessionLocks;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, FragranceMatrix};
use crate::domain::aggregates::{Cart, Order, Product, Wishlist};

/// Storage keyed by an opaque session id. Missing carts and wishlists load
/// as empty; a missing catalog loads as `None`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_cart(&self, session: &str) -> Result<Cart, StoreError>;
    async fn save_cart(&self, session: &str, cart: &Cart) -> Result<(), StoreError>;
    async fn delete_cart(&self, session: &str) -> Result<(), StoreError>;

    async fn load_catalog(&self) -> Result<Option<Vec<Product>>, StoreError>;
    async fn save_catalog(&self, products: &[Product]) -> Result<(), StoreError>;
    async fn clear_catalog(&self) -> Result<(), StoreError>;

    async fn load_wishlist(&self, session: &str) -> Result<Wishlist, StoreError>;
    async fn save_wishlist(&self, session: &str, wishlist: &Wishlist) -> Result<(), StoreError>;

    /// Inserts or updates by id. Fails with [`StoreError::DuplicateOrderNumber`]
    /// when another order already has this order number.
    async fn save_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn delete_order(&self, id: Uuid) -> Result<(), StoreError>;
    async fn load_order(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    /// Newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
}

/// The saved catalog, or the defaults generated from `matrix` when nothing was saved.
pub async fn load_catalog_or_default(store: &dyn SessionStore, matrix: &FragranceMatrix) -> Result<Catalog, StoreError> {
    Ok(match store.load_catalog().await? {
        Some(products) => Catalog::new(products),
        None => Catalog::new(Catalog::default_products(matrix)),
    })
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order number already taken: {0}")]
    DuplicateOrderNumber(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
