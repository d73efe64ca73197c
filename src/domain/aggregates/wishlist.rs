//! Wishlist Aggregate

use serde::{Deserialize, Serialize};

/// Favourite product ids of one session, in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    product_ids: Vec<String>,
}

impl Wishlist {
    pub fn product_ids(&self) -> &[String] { &self.product_ids }
    pub fn is_empty(&self) -> bool { self.product_ids.is_empty() }

    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }

    /// Returns false when the product was already listed.
    pub fn add(&mut self, product_id: impl Into<String>) -> bool {
        let product_id = product_id.into();
        if self.contains(&product_id) {
            return false;
        }
        self.product_ids.push(product_id);
        true
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|id| id != product_id);
        self.product_ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut w = Wishlist::default();
        assert!(w.add("book-001"));
        assert!(!w.add("book-001"));
        assert_eq!(w.product_ids().len(), 1);
        assert!(w.remove("book-001"));
        assert!(!w.remove("book-001"));
        assert!(w.is_empty());
    }
}
