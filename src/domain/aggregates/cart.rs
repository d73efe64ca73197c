//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::{Money, MoneyError, Quantity, STORE_CURRENCY};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// A session's cart. Items are keyed by product id; an item is present
/// exactly when its quantity is positive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: Quantity,
}

impl CartItem {
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        Ok(self.product.unit_price()?.multiply(self.quantity.value()))
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Self { items: vec![], updated_at: Utc::now() }
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn line_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product.id == product_id)
    }

    /// Adds one unit of `product`, merging with an existing line.
    pub fn add(&mut self, product: Product) {
        // quantity 1 is never rejected
        let _ = self.add_quantity(product, 1);
    }

    pub fn add_quantity(&mut self, product: Product, quantity: u32) -> Result<(), CartError> {
        check_quantity(quantity)?;
        if let Some(existing) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            let merged = existing.quantity.add(quantity);
            check_quantity(merged.value())?;
            existing.quantity = merged;
        } else {
            self.items.push(CartItem { product, quantity: Quantity::new(quantity) });
        }
        self.touch();
        Ok(())
    }

    /// Sets the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product_id);
        }
        check_quantity(quantity)?;
        let item = self.items.iter_mut().find(|i| i.product.id == product_id).ok_or_else(|| CartError::ItemNotFound(product_id.to_string()))?;
        item.quantity = Quantity::new(quantity);
        self.touch();
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound(product_id.to_string()));
        }
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    pub fn total_price(&self) -> Result<Money, MoneyError> {
        self.items.iter().try_fold(Money::zero(STORE_CURRENCY), |acc, i| acc.add(&i.line_total()?))
    }

    /// Physical item count: custom sets count each of their components.
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|i| i.product.unit_count().saturating_mul(i.quantity.value())).fold(0, u32::saturating_add)
    }

    /// Takes the lines of `ordered` out of this cart. Lines added or topped
    /// up since `ordered` was taken keep the difference.
    pub fn remove_ordered(&mut self, ordered: &Cart) {
        for line in &ordered.items {
            if let Some(idx) = self.items.iter().position(|i| i.product.id == line.product.id) {
                match self.items[idx].quantity.subtract(line.quantity.value()).filter(|q| !q.is_zero()) {
                    Some(rest) => self.items[idx].quantity = rest,
                    None => {
                        self.items.remove(idx);
                    }
                }
            }
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn check_quantity(quantity: u32) -> Result<(), CartError> {
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
        return Err(CartError::InvalidQuantity);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart has no item {0}")]
    ItemNotFound(String),
    #[error("quantity must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{sample, Category, SetItem};
    use rust_decimal::Decimal;

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new();
        cart.add(sample("P1", Category::Books, 10));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_price().unwrap().amount(), Decimal::new(10, 0));
        cart.add(sample("P1", Category::Books, 10));
        assert_eq!(cart.items()[0].quantity.value(), 2); // Merged
        cart.add_quantity(sample("P2", Category::Candles, 5), 3).unwrap();
        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price().unwrap().amount(), Decimal::new(35, 0));
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = Cart::new();
        cart.add(sample("P1", Category::Books, 10));
        cart.update_quantity("P1", 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity("P1", 2), Err(CartError::ItemNotFound("P1".into())));
        assert_eq!(cart.add_quantity(sample("P1", Category::Books, 10), 0), Err(CartError::InvalidQuantity));
    }

    #[test]
    fn test_custom_set_totals() {
        let mut set = sample("custom-set-x", Category::Baskets, 0);
        set.custom_set = Some(vec![
            SetItem { product: sample("c", Category::Candles, 1490), quantity: 2 },
            SetItem { product: sample("s", Category::Sachets, 620), quantity: 1 },
        ]);
        let mut cart = Cart::new();
        cart.add_quantity(set, 2).unwrap();
        assert_eq!(cart.total_items(), 6);
        assert_eq!(cart.total_price().unwrap().amount(), Decimal::from(2 * (2 * 1490 + 620)));
    }

    #[test]
    fn test_line_quantity_is_capped() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_quantity(sample("P1", Category::Baskets, 10), 10_000_000), Err(CartError::InvalidQuantity));
        cart.add_quantity(sample("P1", Category::Baskets, 10), MAX_LINE_QUANTITY).unwrap();
        assert_eq!(cart.add_quantity(sample("P1", Category::Baskets, 10), 1), Err(CartError::InvalidQuantity));
        assert_eq!(cart.update_quantity("P1", u32::MAX), Err(CartError::InvalidQuantity));
        assert_eq!(cart.items()[0].quantity.value(), MAX_LINE_QUANTITY);
        assert_eq!(cart.total_items(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_total_items_saturates() {
        let mut set = sample("custom-set-x", Category::Baskets, 0);
        set.custom_set = Some(vec![
            SetItem { product: sample("c", Category::Candles, 1), quantity: u32::MAX },
            SetItem { product: sample("s", Category::Sachets, 1), quantity: u32::MAX },
        ]);
        let mut cart = Cart::new();
        cart.add_quantity(set, 3).unwrap();
        cart.add(sample("P1", Category::Books, 10));
        assert_eq!(cart.total_items(), u32::MAX);
    }

    #[test]
    fn test_remove_ordered_keeps_later_additions() {
        let mut cart = Cart::new();
        cart.add_quantity(sample("P1", Category::Books, 10), 2).unwrap();
        let ordered = cart.clone();
        cart.add(sample("P1", Category::Books, 10));
        cart.add(sample("P2", Category::Candles, 5));
        cart.remove_ordered(&ordered);
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.get("P1").unwrap().quantity.value(), 1);

        let ordered = cart.clone();
        cart.remove_ordered(&ordered);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(sample("P1", Category::Books, 10));
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.total_price().unwrap().is_zero());
    }
}
