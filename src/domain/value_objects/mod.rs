//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Store currency. Every catalog price is quoted in whole roubles.
pub const STORE_CURRENCY: &str = "RUB";

/// SEO-friendly handle used in product URLs
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Builds a slug from free-text parts: lowercased, punctuation dropped,
    /// whitespace runs collapsed into `-`, parts joined with `-`.
    pub fn from_parts<I, S>(parts: I) -> Result<Self, SlugError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = parts
            .into_iter()
            .flat_map(|part| {
                part.as_ref()
                    .to_lowercase()
                    .chars()
                    .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                    .collect::<String>()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        if words.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(words.join("-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("slug has no usable characters")]
    Empty,
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self { amount, currency: currency.to_string() }
    }

    pub fn rub(amount: impl Into<Decimal>) -> Self {
        Self::new(amount.into(), STORE_CURRENCY)
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }

    pub fn multiply(&self, qty: u32) -> Money {
        Money::new(self.amount * Decimal::from(qty), &self.currency)
    }

    /// Price after taking `percent` off, rounded to whole units (half away from zero).
    pub fn percent_off(&self, percent: u8) -> Money {
        let factor = Decimal::from(100u32.saturating_sub(u32::from(percent))) / Decimal::ONE_HUNDRED;
        let amount = (self.amount * factor).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Money::new(amount, &self.currency)
    }

    /// Sums an iterator of amounts, failing on the first currency mismatch.
    pub fn sum<'a, I>(currency: &str, items: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        items.into_iter().try_fold(Money::zero(currency), |acc, m| acc.add(m))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero(STORE_CURRENCY)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.normalize(), self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
}

/// Quantity value object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self {
        Self(value)
    }
    pub fn value(&self) -> u32 {
        self.0
    }
    pub fn add(&self, other: u32) -> Self {
        Self(self.0.saturating_add(other))
    }
    pub fn subtract(&self, other: u32) -> Option<Self> {
        self.0.checked_sub(other).map(Self)
    }
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
