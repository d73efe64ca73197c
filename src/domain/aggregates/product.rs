//! Product Aggregate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::value_objects::{Money, MoneyError, STORE_CURRENCY};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Books,
    Candles,
    Sachets,
    Baskets,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Books, Category::Candles, Category::Sachets, Category::Baskets];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Candles => "candles",
            Self::Sachets => "sachets",
            Self::Baskets => "baskets",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Books => "Books",
            Self::Candles => "Candles",
            Self::Sachets => "Sachets",
            Self::Baskets => "Baskets & organizers",
        }
    }

    /// Categories whose products come out of the fragrance×format matrix.
    pub fn is_aromatic(&self) -> bool {
        matches!(self, Self::Candles | Self::Sachets)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "books" => Ok(Self::Books),
            "candles" => Ok(Self::Candles),
            "sachets" => Ok(Self::Sachets),
            "baskets" => Ok(Self::Baskets),
            other => Err(ProductError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub percent: u8,
    pub active: bool,
}

/// One component of a custom set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetItem {
    pub product: Product,
    pub quantity: u32,
}

impl SetItem {
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        Ok(self.product.unit_price()?.multiply(self.quantity))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub name: String,
    pub category: Category,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    pub image: String,
    pub description: String,
    pub in_stock: bool,
    pub rating: f32,
    pub reviews: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub characteristics: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragrance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_set: Option<Vec<SetItem>>,
}

impl Product {
    pub fn is_custom_set(&self) -> bool {
        self.custom_set.is_some()
    }

    /// Price of one unit. A custom set is priced by its components rather
    /// than by the price stamped on the virtual record.
    pub fn unit_price(&self) -> Result<Money, MoneyError> {
        match &self.custom_set {
            Some(items) => items.iter().try_fold(Money::zero(STORE_CURRENCY), |acc, item| acc.add(&item.line_total()?)),
            None => Ok(self.price.clone()),
        }
    }

    /// Number of physical items one unit stands for.
    pub fn unit_count(&self) -> u32 {
        match &self.custom_set {
            Some(items) => items.iter().map(|i| i.quantity).fold(0, u32::saturating_add),
            None => 1,
        }
    }

    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }

    pub fn apply_discount(&mut self, percent: u8) -> Result<(), ProductError> {
        if percent == 0 || percent >= 100 {
            return Err(ProductError::InvalidDiscount(percent));
        }
        let base = self.original_price.clone().unwrap_or_else(|| self.price.clone());
        self.price = base.percent_off(percent);
        self.original_price = Some(base);
        self.discount = Some(Discount { percent, active: true });
        Ok(())
    }

    pub fn clear_discount(&mut self) {
        if let Some(original) = self.original_price.take() {
            self.price = original;
        }
        self.discount = None;
    }

    /// Overwrites the price. Any discount is dropped along with the price it
    /// was computed from.
    pub fn set_price(&mut self, price: Money) {
        self.price = price;
        self.original_price = None;
        self.discount = None;
    }

    pub fn apply_patch(&mut self, patch: ProductPatch) {
        let ProductPatch { name, category, price, image, description, in_stock, rating, reviews, tags, characteristics } = patch;
        if let Some(v) = name { self.name = v; }
        if let Some(v) = category { self.category = v; }
        if let Some(v) = price { self.set_price(v); }
        if let Some(v) = image { self.image = v; }
        if let Some(v) = description { self.description = v; }
        if let Some(v) = in_stock { self.in_stock = v; }
        if let Some(v) = rating { self.rating = v; }
        if let Some(v) = reviews { self.reviews = v; }
        if let Some(v) = tags { self.tags = v; }
        if let Some(v) = characteristics { self.characteristics = v; }
    }
}

/// Partial update applied by catalog admin forms.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub price: Option<Money>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub in_stock: Option<bool>,
    pub rating: Option<f32>,
    pub reviews: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub characteristics: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("discount must be between 1 and 99 percent, got {0}")]
    InvalidDiscount(u8),
}

#[cfg(test)]
pub(crate) fn sample(id: &str, category: Category, price: i64) -> Product {
    Product {
        id: id.to_string(),
        slug: None,
        name: format!("Product {id}"),
        category,
        price: Money::rub(price),
        original_price: None,
        discount: None,
        image: String::new(),
        description: String::new(),
        in_stock: true,
        rating: 4.5,
        reviews: 0,
        tags: vec![],
        characteristics: BTreeMap::new(),
        fragrance: None,
        format: None,
        custom_set: None,
    }
}
