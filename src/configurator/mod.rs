//! Gift-set configurator.
//!
//! Two ways to put a set together:
//!
//! - a [`ReadySet`] template whose choice slots the shopper fills in
//!   (a fragrance for a fixed format, or one of a short list of products);
//! - a free-form [`SetBuilder`] fed by the step-wise [`ItemChoice`] picker.
//!
//! Either can be turned into a virtual custom-set [`Product`] so the cart
//! keeps a single item shape.

mod ready_sets;

pub use ready_sets::ready_sets;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::fragrances::pair_id;
use crate::catalog::{Catalog, CategoryFilter, Format, Fragrance, FragranceMatrix, MatrixError};
use crate::domain::aggregates::{Category, Product, SetItem, MAX_LINE_QUANTITY};
use crate::domain::value_objects::{Money, MoneyError, STORE_CURRENCY};

const FALLBACK_SET_IMAGE: &str = "https://images.pexels.com/photos/4792488/pexels-photo-4792488.jpeg?auto=compress&cs=tinysrgb&w=800";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SlotKind {
    Fixed { product_id: String },
    FragranceChoice { format_id: String },
    ProductChoice { product_ids: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSlot {
    #[serde(flatten)]
    pub kind: SlotKind,
    pub quantity: u32,
    pub label: String,
}

impl SetSlot {
    pub fn needs_choice(&self) -> bool {
        !matches!(self.kind, SlotKind::Fixed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadySet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub slots: Vec<SetSlot>,
    pub original_price: Money,
    pub discount_price: Money,
    pub tags: Vec<String>,
}

/// Slot index → chosen fragrance id or product id.
pub type Selections = BTreeMap<usize, String>;

impl ReadySet {
    /// Advertised saving, rounded to a whole percent.
    pub fn discount_percent(&self) -> u32 {
        let original = self.original_price.amount();
        if original.is_zero() {
            return 0;
        }
        let saved = (Decimal::ONE - self.discount_price.amount() / original) * Decimal::ONE_HUNDRED;
        saved.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero).to_u32().unwrap_or(0)
    }

    pub fn is_ready(&self, selections: &Selections) -> bool {
        self.slots
            .iter()
            .enumerate()
            .all(|(idx, slot)| !slot.needs_choice() || selections.get(&idx).is_some_and(|s| !s.is_empty()))
    }

    /// Resolves every slot into a product. Missing or invalid choices are errors.
    pub fn resolve(&self, selections: &Selections, catalog: &Catalog, matrix: &FragranceMatrix) -> Result<Vec<SetItem>, ConfiguratorError> {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, _)| {
                self.resolve_slot(idx, selections.get(&idx).map(String::as_str), catalog, matrix)?
                    .ok_or(ConfiguratorError::MissingSelection { set: self.id.clone(), slot: idx })
            })
            .collect()
    }

    /// `Ok(None)` when a choice slot has no selection yet.
    fn resolve_slot(&self, idx: usize, selection: Option<&str>, catalog: &Catalog, matrix: &FragranceMatrix) -> Result<Option<SetItem>, ConfiguratorError> {
        let slot = &self.slots[idx];
        let selection = selection.filter(|s| !s.is_empty());
        let product = match (&slot.kind, selection) {
            (SlotKind::Fixed { product_id }, _) => lookup(catalog, product_id)?,
            (_, None) => return Ok(None),
            (SlotKind::FragranceChoice { format_id }, Some(fragrance_id)) => matrix_product(catalog, matrix, fragrance_id, format_id)?,
            (SlotKind::ProductChoice { product_ids }, Some(product_id)) => {
                if !product_ids.iter().any(|p| p == product_id) {
                    return Err(ConfiguratorError::InvalidSelection { set: self.id.clone(), slot: idx, choice: product_id.to_string() });
                }
                lookup(catalog, product_id)?
            }
        };
        Ok(Some(SetItem { product, quantity: slot.quantity }))
    }

    /// Starts a configurable builder from the slots resolved so far; unfilled
    /// choice slots are left out.
    pub fn to_builder(&self, selections: &Selections, catalog: &Catalog, matrix: &FragranceMatrix) -> Result<SetBuilder, ConfiguratorError> {
        let mut builder = SetBuilder::default();
        for idx in 0..self.slots.len() {
            if let Some(item) = self.resolve_slot(idx, selections.get(&idx).map(String::as_str), catalog, matrix)? {
                builder.add(item.product, item.quantity)?;
            }
        }
        Ok(builder)
    }
}

pub fn find_ready_set(id: &str) -> Result<ReadySet, ConfiguratorError> {
    ready_sets().into_iter().find(|s| s.id == id).ok_or_else(|| ConfiguratorError::UnknownSet(id.to_string()))
}

fn lookup(catalog: &Catalog, product_id: &str) -> Result<Product, ConfiguratorError> {
    catalog.get(product_id).cloned().ok_or_else(|| ConfiguratorError::ProductNotFound(product_id.to_string()))
}

/// The matrix decides availability; the catalog record wins when present so
/// admin price edits carry into sets.
fn matrix_product(catalog: &Catalog, matrix: &FragranceMatrix, fragrance_id: &str, format_id: &str) -> Result<Product, ConfiguratorError> {
    let generated = matrix.product(fragrance_id, format_id)?;
    Ok(catalog.get(&pair_id(fragrance_id, format_id)).cloned().unwrap_or(generated))
}

/// One step-wise pick: a format and fragrance for candles and sachets, or a
/// product for books and baskets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChoice {
    pub category: Category,
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub fragrance_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

impl ItemChoice {
    pub fn is_ready(&self) -> bool {
        if self.quantity < 1 {
            return false;
        }
        if self.category.is_aromatic() {
            self.format_id.is_some() && self.fragrance_id.is_some()
        } else {
            self.product_id.is_some()
        }
    }

    pub fn resolve(&self, catalog: &Catalog, matrix: &FragranceMatrix) -> Result<SetItem, ConfiguratorError> {
        if !self.is_ready() {
            return Err(ConfiguratorError::IncompleteChoice(self.category));
        }
        let product = if self.category.is_aromatic() {
            let (format_id, fragrance_id) = match (&self.format_id, &self.fragrance_id) {
                (Some(f), Some(g)) => (f, g),
                _ => return Err(ConfiguratorError::IncompleteChoice(self.category)),
            };
            let format = matrix.format(format_id).ok_or_else(|| MatrixError::UnknownFormat(format_id.clone()))?;
            if format.format_type.category() != self.category {
                return Err(ConfiguratorError::CategoryMismatch { id: format_id.clone(), category: self.category });
            }
            matrix_product(catalog, matrix, fragrance_id, format_id)?
        } else {
            let product_id = self.product_id.as_deref().ok_or(ConfiguratorError::IncompleteChoice(self.category))?;
            let product = lookup(catalog, product_id)?;
            if product.category != self.category {
                return Err(ConfiguratorError::CategoryMismatch { id: product.id, category: self.category });
            }
            product
        };
        Ok(SetItem { product, quantity: self.quantity })
    }
}

/// What the picker offers at each step.
pub struct PickerOptions<'a> {
    catalog: &'a Catalog,
    matrix: &'a FragranceMatrix,
}

impl<'a> PickerOptions<'a> {
    pub fn new(catalog: &'a Catalog, matrix: &'a FragranceMatrix) -> Self {
        Self { catalog, matrix }
    }

    pub fn formats(&self, category: Category) -> Vec<&'a Format> {
        self.matrix.formats_in_category(category)
    }

    pub fn fragrances(&self, format_id: &str) -> Vec<&'a Fragrance> {
        self.matrix.fragrances_for_format(format_id)
    }

    /// Catalog products for non-aromatic categories; aromatic ones go through formats.
    pub fn products(&self, category: Category) -> Vec<&'a Product> {
        if category.is_aromatic() {
            return vec![];
        }
        self.catalog.by_category(CategoryFilter::Only(category))
    }
}

/// Where a virtual set product came from.
#[derive(Clone, Copy, Debug)]
pub enum SetOrigin<'a> {
    Personal,
    Configured(&'a ReadySet),
}

/// A set being assembled. Items are keyed by product id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SetBuilder {
    items: Vec<SetItem>,
}

impl SetBuilder {
    pub fn items(&self) -> &[SetItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn add(&mut self, product: Product, quantity: u32) -> Result<(), ConfiguratorError> {
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(ConfiguratorError::InvalidQuantity);
        }
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(existing) => {
                let merged = existing.quantity.saturating_add(quantity);
                if merged > MAX_LINE_QUANTITY {
                    return Err(ConfiguratorError::InvalidQuantity);
                }
                existing.quantity = merged;
            }
            None => self.items.push(SetItem { product, quantity }),
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        self.items.len() != before
    }

    /// Zero removes the item.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.items.iter_mut().find(|i| i.product.id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> Result<Money, MoneyError> {
        self.items.iter().try_fold(Money::zero(STORE_CURRENCY), |acc, i| acc.add(&i.line_total()?))
    }

    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).fold(0, u32::saturating_add)
    }

    /// Synthesizes the cart record standing for this set.
    pub fn into_virtual_product(self, origin: SetOrigin<'_>) -> Result<Product, ConfiguratorError> {
        if self.items.is_empty() {
            return Err(ConfiguratorError::EmptySet);
        }
        let price = self.total()?;
        let listing = self.items.iter().map(|i| format!("{} ({} pcs)", i.product.name, i.quantity)).collect::<Vec<_>>().join(", ");
        let (id, name, image, description, tags) = match origin {
            SetOrigin::Personal => (
                format!("custom-set-{}", Uuid::new_v4()),
                "My custom set".to_string(),
                self.items.first().map(|i| i.product.image.clone()).filter(|s| !s.is_empty()).unwrap_or_else(|| FALLBACK_SET_IMAGE.to_string()),
                format!("Personal set of {} items: {}", self.items.len(), listing),
                ["set", "personal", "configurator"],
            ),
            SetOrigin::Configured(set) => (
                format!("configured-set-{}", Uuid::new_v4()),
                format!("{} (configured)", set.name),
                set.image.clone(),
                format!("Configured set of {} items: {}", self.items.len(), listing),
                ["set", "configured", "configurator"],
            ),
        };
        tracing::debug!(set_id = %id, items = self.items.len(), %price, "virtual set product synthesized");
        Ok(Product {
            id,
            slug: None,
            name,
            category: Category::Baskets,
            price,
            original_price: None,
            discount: None,
            image,
            description,
            in_stock: true,
            rating: 5.0,
            reviews: 0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            characteristics: BTreeMap::new(),
            fragrance: None,
            format: None,
            custom_set: Some(self.items),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfiguratorError {
    #[error("unknown ready set: {0}")]
    UnknownSet(String),
    #[error("set {set}: slot {slot} has no selection")]
    MissingSelection { set: String, slot: usize },
    #[error("set {set}: {choice} is not offered in slot {slot}")]
    InvalidSelection { set: String, slot: usize, choice: String },
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("{id} does not belong to category {category}")]
    CategoryMismatch { id: String, category: Category },
    #[error("choice for {0} is incomplete")]
    IncompleteChoice(Category),
    #[error("quantity must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity,
    #[error("set is empty")]
    EmptySet,
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Money(#[from] MoneyError),
}
