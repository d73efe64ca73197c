//! Delivery quotes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{Cart, Category};
use crate::domain::value_objects::Money;

/// A priced delivery tariff offered to the customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOption {
    pub tariff_code: u32,
    pub name: String,
    pub price: Money,
    pub min_days: u32,
    pub max_days: u32,
}

impl DeliveryOption {
    pub fn period(&self) -> String {
        format_period(self.min_days, self.max_days)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub from_city: u32,
    pub to_city: u32,
    pub weight_grams: u32,
}

#[async_trait]
pub trait DeliveryEstimator: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> Vec<DeliveryOption>;
}

/// Fixed tariffs used when no carrier is wired in.
#[derive(Clone, Debug, Default)]
pub struct FlatRateEstimator;

#[async_trait]
impl DeliveryEstimator for FlatRateEstimator {
    async fn quote(&self, request: &QuoteRequest) -> Vec<DeliveryOption> {
        tracing::debug!(from = request.from_city, to = request.to_city, weight = request.weight_grams, "flat rate delivery quote");
        vec![
            DeliveryOption { tariff_code: 136, name: "Parcel warehouse-warehouse".into(), price: Money::rub(300), min_days: 2, max_days: 4 },
            DeliveryOption { tariff_code: 137, name: "Parcel warehouse-door".into(), price: Money::rub(450), min_days: 1, max_days: 3 },
        ]
    }
}

fn item_weight(category: Category) -> u32 {
    match category {
        Category::Books => 300,
        Category::Candles => 200,
        Category::Sachets => 50,
        Category::Baskets => 500,
    }
}

/// Shipping weight in grams.
pub fn order_weight(cart: &Cart) -> u32 {
    cart.items().iter().map(|i| item_weight(i.product.category).saturating_mul(i.quantity.value())).fold(0, u32::saturating_add)
}

pub fn format_period(min: u32, max: u32) -> String {
    if min == max {
        let unit = if min == 1 { "day" } else { "days" };
        format!("{min} {unit}")
    } else {
        format!("{min}-{max} days")
    }
}
