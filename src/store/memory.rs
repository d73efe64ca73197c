use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SessionStore, StoreError};
use crate::domain::aggregates::{Cart, Order, Product, Wishlist};

/// Process-local store. State is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    carts: RwLock<HashMap<String, Cart>>,
    wishlists: RwLock<HashMap<String, Wishlist>>,
    catalog: RwLock<Option<Vec<Product>>>,
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_cart(&self, session: &str) -> Result<Cart, StoreError> {
        Ok(self.carts.read().await.get(session).cloned().unwrap_or_default())
    }

    async fn save_cart(&self, session: &str, cart: &Cart) -> Result<(), StoreError> {
        self.carts.write().await.insert(session.to_string(), cart.clone());
        Ok(())
    }

    async fn delete_cart(&self, session: &str) -> Result<(), StoreError> {
        self.carts.write().await.remove(session);
        Ok(())
    }

    async fn load_catalog(&self) -> Result<Option<Vec<Product>>, StoreError> {
        Ok(self.catalog.read().await.clone())
    }

    async fn save_catalog(&self, products: &[Product]) -> Result<(), StoreError> {
        *self.catalog.write().await = Some(products.to_vec());
        Ok(())
    }

    async fn clear_catalog(&self) -> Result<(), StoreError> {
        *self.catalog.write().await = None;
        Ok(())
    }

    async fn load_wishlist(&self, session: &str) -> Result<Wishlist, StoreError> {
        Ok(self.wishlists.read().await.get(session).cloned().unwrap_or_default())
    }

    async fn save_wishlist(&self, session: &str, wishlist: &Wishlist) -> Result<(), StoreError> {
        self.wishlists.write().await.insert(session.to_string(), wishlist.clone());
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        if orders.values().any(|o| o.order_number() == order.order_number() && o.id() != order.id()) {
            return Err(StoreError::DuplicateOrderNumber(order.order_number().to_string()));
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), StoreError> {
        self.orders.write().await.remove(&id);
        Ok(())
    }

    async fn load_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FragranceMatrix;
    use crate::domain::aggregates::product::{sample, Category};
    use crate::domain::aggregates::{ContactDetails, DeliveryKind, DeliverySummary, PaymentMethod};
    use crate::domain::value_objects::Money;
    use crate::store::load_catalog_or_default;

    fn order(number: &str) -> Order {
        let mut cart = Cart::new();
        cart.add(sample("a", Category::Books, 100));
        let contact = ContactDetails { first_name: "Anna".into(), last_name: "Petrova".into(), email: "anna@example.com".into(), phone: "+7 900".into() };
        let delivery = DeliverySummary { kind: DeliveryKind::Pickup, address: String::new(), date: "2024-02-01".into(), time: String::new(), price: Money::rub(0) };
        Order::place(number, contact, &cart, delivery, PaymentMethod::Cash, None).unwrap()
    }

    #[tokio::test]
    async fn test_cart_round_trip_and_delete() {
        let store = MemoryStore::new();
        assert!(store.load_cart("s1").await.unwrap().is_empty());
        let mut cart = Cart::new();
        cart.add(sample("a", Category::Books, 100));
        store.save_cart("s1", &cart).await.unwrap();
        assert_eq!(store.load_cart("s1").await.unwrap().total_items(), 1);
        assert!(store.load_cart("s2").await.unwrap().is_empty());
        store.delete_cart("s1").await.unwrap();
        assert!(store.load_cart("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_falls_back_to_defaults() {
        let store = MemoryStore::new();
        let matrix = FragranceMatrix::standard();
        assert_eq!(load_catalog_or_default(&store, &matrix).await.unwrap().len(), 79);
        store.save_catalog(&[sample("a", Category::Books, 100)]).await.unwrap();
        assert_eq!(load_catalog_or_default(&store, &matrix).await.unwrap().len(), 1);
        store.clear_catalog().await.unwrap();
        assert_eq!(load_catalog_or_default(&store, &matrix).await.unwrap().len(), 79);
    }

    #[tokio::test]
    async fn test_order_numbers_are_unique() {
        let store = MemoryStore::new();
        let mut first = order("ORD-00000001");
        store.save_order(&first).await.unwrap();
        first.start_processing().unwrap();
        store.save_order(&first).await.unwrap();

        let clash = order("ORD-00000001");
        assert!(matches!(store.save_order(&clash).await, Err(StoreError::DuplicateOrderNumber(n)) if n == "ORD-00000001"));
        store.delete_order(first.id()).await.unwrap();
        store.save_order(&clash).await.unwrap();
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wishlist_per_session() {
        let store = MemoryStore::new();
        let mut w = Wishlist::default();
        w.add("book-001");
        store.save_wishlist("s1", &w).await.unwrap();
        assert!(store.load_wishlist("s1").await.unwrap().contains("book-001"));
        assert!(store.load_wishlist("s2").await.unwrap().is_empty());
    }
}
