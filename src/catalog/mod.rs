//! Product catalog: the default records, admin edits and storefront queries.

pub mod fragrances;
pub mod seed;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::aggregates::{Category, Product, ProductPatch};
use crate::domain::events::CatalogEvent;
use crate::domain::value_objects::Money;

pub use fragrances::{Format, FormatType, Fragrance, FragranceMatrix, MatrixError};

/// `all` or a single category, as used by category pickers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        match s {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only).map_err(|_| CatalogError::UnknownCategory(other.to_string())),
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => *c == category,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "price-low")]
    PriceLow,
    #[serde(rename = "price-high")]
    PriceHigh,
    #[serde(rename = "rating")]
    Rating,
}

/// Catalog page filters. Price bounds are inclusive.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub average_price: Decimal,
    pub average_rating: String,
    pub by_category: BTreeMap<Category, usize>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PriceUpdate {
    pub id: String,
    pub price: Money,
}

/// The working product list. Every mutation raises a [`CatalogEvent`]
/// that the caller drains with [`Catalog::take_events`].
#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
    events: Vec<CatalogEvent>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products, events: vec![] }
    }

    /// Base products followed by the generated fragrance matrix.
    pub fn default_products(matrix: &FragranceMatrix) -> Vec<Product> {
        let mut products = seed::base_products();
        products.extend(matrix.generate_all());
        products
    }

    pub fn with_defaults() -> Self {
        Self::new(Self::default_products(&FragranceMatrix::standard()))
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn into_products(self) -> Vec<Product> { self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn by_category(&self, filter: CategoryFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p.category)).collect()
    }

    pub fn search(&self, text: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| p.matches_text(text)).collect()
    }

    pub fn query(&self, q: &CatalogQuery) -> Result<Vec<&Product>, CatalogError> {
        let filter = match q.category.as_deref() {
            Some(c) => CategoryFilter::parse(c)?,
            None => CategoryFilter::All,
        };
        let search = q.search.as_deref().map(str::trim).unwrap_or_default();
        let mut found: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| search.is_empty() || p.matches_text(search))
            .filter(|p| filter.matches(p.category))
            .filter(|p| q.min_price.map_or(true, |min| p.price.amount() >= min))
            .filter(|p| q.max_price.map_or(true, |max| p.price.amount() <= max))
            .collect();
        match q.sort {
            SortOrder::Name => found.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::PriceLow => found.sort_by(|a, b| a.price.amount().cmp(&b.price.amount())),
            SortOrder::PriceHigh => found.sort_by(|a, b| b.price.amount().cmp(&a.price.amount())),
            SortOrder::Rating => found.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
        Ok(found)
    }

    pub fn add(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.get(&product.id).is_some() {
            return Err(CatalogError::DuplicateId(product.id));
        }
        tracing::info!(product_id = %product.id, "catalog product added");
        self.events.push(CatalogEvent::ProductAdded { product_id: product.id.clone() });
        self.products.push(product);
        Ok(())
    }

    pub fn update(&mut self, id: &str, patch: ProductPatch) -> Result<&Product, CatalogError> {
        let idx = self.position(id)?;
        self.products[idx].apply_patch(patch);
        self.events.push(CatalogEvent::ProductUpdated { product_id: id.to_string() });
        Ok(&self.products[idx])
    }

    pub fn delete(&mut self, id: &str) -> Result<Product, CatalogError> {
        let idx = self.position(id)?;
        tracing::info!(product_id = %id, "catalog product deleted");
        self.events.push(CatalogEvent::ProductDeleted { product_id: id.to_string() });
        Ok(self.products.remove(idx))
    }

    /// Applies the prices whose ids are known; returns how many changed.
    pub fn update_prices(&mut self, updates: &[PriceUpdate]) -> usize {
        let mut changed = 0;
        for product in &mut self.products {
            if let Some(u) = updates.iter().find(|u| u.id == product.id) {
                product.set_price(u.price.clone());
                changed += 1;
            }
        }
        self.events.push(CatalogEvent::PricesUpdated { count: changed });
        changed
    }

    /// Sets the stock flag on every product, or only those in `filter`.
    pub fn bulk_update_stock(&mut self, in_stock: bool, filter: CategoryFilter) -> usize {
        let mut changed = 0;
        for product in self.products.iter_mut().filter(|p| filter.matches(p.category)) {
            product.in_stock = in_stock;
            changed += 1;
        }
        self.events.push(CatalogEvent::StockUpdated { in_stock, count: changed });
        changed
    }

    /// Replaces every product with the defaults generated from `matrix`.
    pub fn reset(&mut self, matrix: &FragranceMatrix) {
        self.products = Self::default_products(matrix);
        tracing::info!(total = self.products.len(), "catalog reset to defaults");
        self.events.push(CatalogEvent::Reset { total: self.products.len() });
    }

    /// Replaces the generated aromatic products with a fresh matrix run,
    /// keeping hand-entered products.
    pub fn regenerate_matrix(&mut self, matrix: &FragranceMatrix) {
        self.products.retain(|p| p.fragrance.is_none());
        self.products.extend(matrix.generate_all());
        self.events.push(CatalogEvent::Reset { total: self.products.len() });
    }

    pub fn stats(&self) -> CatalogStats {
        let total = self.products.len();
        let in_stock = self.products.iter().filter(|p| p.in_stock).count();
        let mut by_category: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
        for p in &self.products {
            *by_category.entry(p.category).or_default() += 1;
        }
        let (average_price, average_rating) = if total == 0 {
            (Decimal::ZERO, "0".to_string())
        } else {
            let price_sum: Decimal = self.products.iter().map(|p| p.price.amount()).sum();
            let rating_sum: f64 = self.products.iter().map(|p| f64::from(p.rating)).sum();
            let avg_price = (price_sum / Decimal::from(total)).round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
            (avg_price, format!("{:.1}", rating_sum / total as f64))
        };
        CatalogStats { total, in_stock, out_of_stock: total - in_stock, average_price, average_rating, by_category }
    }

    pub fn take_events(&mut self) -> Vec<CatalogEvent> {
        std::mem::take(&mut self.events)
    }

    fn position(&self, id: &str) -> Result<usize, CatalogError> {
        self.products.iter().position(|p| p.id == id).ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("product id already exists: {0}")]
    DuplicateId(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
