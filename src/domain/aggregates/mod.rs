//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod wishlist;

pub use product::{Category, Discount, Product, ProductError, ProductPatch, SetItem};
pub use order::{ContactDetails, DeliveryKind, DeliverySummary, LineItem, Order, OrderError, OrderStatus, PaymentMethod, PaymentSummary};
pub use cart::{Cart, CartError, CartItem, MAX_LINE_QUANTITY};
pub use wishlist::Wishlist;
