use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{SessionStore, StoreError};
use crate::domain::aggregates::{Cart, Order, Product, Wishlist};

/// PostgreSQL store. Aggregates are kept as JSONB documents.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn load_cart(&self, session: &str) -> Result<Cart, StoreError> {
        let row: Option<(Json<Cart>,)> = sqlx::query_as("SELECT body FROM carts WHERE session_id = $1")
            .bind(session)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(cart),)| cart).unwrap_or_default())
    }

    async fn save_cart(&self, session: &str, cart: &Cart) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO carts (session_id, body, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (session_id) DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()",
        )
        .bind(session)
        .bind(Json(cart))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_cart(&self, session: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM carts WHERE session_id = $1").bind(session).execute(&self.pool).await?;
        Ok(())
    }

    async fn load_catalog(&self) -> Result<Option<Vec<Product>>, StoreError> {
        let row: Option<(Json<Vec<Product>>,)> = sqlx::query_as("SELECT products FROM catalog_snapshot WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(products),)| products))
    }

    async fn save_catalog(&self, products: &[Product]) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO catalog_snapshot (id, products, updated_at) VALUES (1, $1, NOW()) \
             ON CONFLICT (id) DO UPDATE SET products = EXCLUDED.products, updated_at = NOW()",
        )
        .bind(Json(products))
        .execute(&self.pool)
        .await?;
        tracing::debug!(count = products.len(), "catalog snapshot saved");
        Ok(())
    }

    async fn clear_catalog(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM catalog_snapshot").execute(&self.pool).await?;
        Ok(())
    }

    async fn load_wishlist(&self, session: &str) -> Result<Wishlist, StoreError> {
        let row: Option<(Json<Wishlist>,)> = sqlx::query_as("SELECT body FROM wishlists WHERE session_id = $1")
            .bind(session)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(w),)| w).unwrap_or_default())
    }

    async fn save_wishlist(&self, session: &str, wishlist: &Wishlist) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO wishlists (session_id, body) VALUES ($1, $2) \
             ON CONFLICT (session_id) DO UPDATE SET body = EXCLUDED.body",
        )
        .bind(session)
        .bind(Json(wishlist))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders (id, order_number, body, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET body = EXCLUDED.body",
        )
        .bind(order.id())
        .bind(order.order_number())
        .bind(Json(order))
        .bind(order.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::DuplicateOrderNumber(order.order_number().to_string()),
            _ => StoreError::Database(e),
        })?;
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn load_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row: Option<(Json<Order>,)> = sqlx::query_as("SELECT body FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(order),)| order))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<(Json<Order>,)> = sqlx::query_as("SELECT body FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(Json(order),)| order).collect())
    }
}
