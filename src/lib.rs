//! Home-goods storefront.
//!
//! Catalog of books, baskets and aromatic goods generated from a
//! fragrance × format matrix, per-session carts and wishlists, a gift-set
//! configurator and a step-validated checkout. [`api`] exposes it all as a
//! JSON service.

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod configurator;
pub mod content;
pub mod domain;
pub mod notify;
pub mod store;

use thiserror::Error;

use crate::catalog::{CatalogError, MatrixError};
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::configurator::ConfiguratorError;
use crate::domain::aggregates::{CartError, OrderError, ProductError};
use crate::domain::value_objects::MoneyError;
use crate::notify::NotifyError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Configurator(#[from] ConfiguratorError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
