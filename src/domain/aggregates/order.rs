//! Order Aggregate
//!
//! An order is the flat snapshot taken when checkout is submitted: customer
//! contact fields, the cart lines, the chosen delivery and payment method.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::cart::Cart;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, MoneyError, STORE_CURRENCY};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactDetails {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
}

impl ContactDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    #[default]
    Delivery,
    Pickup,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::Cash => "Cash",
            Self::Transfer => "Bank transfer",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySummary {
    pub kind: DeliveryKind,
    pub address: String,
    pub date: String,
    pub time: String,
    pub price: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub method: PaymentMethod,
    pub amount: Money,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    order_number: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    customer: ContactDetails,
    items: Vec<LineItem>,
    subtotal: Money,
    delivery: DeliverySummary,
    payment: PaymentSummary,
    comment: Option<String>,
    status: OrderStatus,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Order {
    /// Snapshots `cart` into a pending order. Fails on an empty cart.
    pub fn place(
        order_number: impl Into<String>,
        customer: ContactDetails,
        cart: &Cart,
        delivery: DeliverySummary,
        method: PaymentMethod,
        comment: Option<String>,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::NoItems);
        }
        let items = cart
            .items()
            .iter()
            .map(|i| {
                let unit_price = i.product.unit_price()?;
                Ok(LineItem {
                    product_id: i.product.id.clone(),
                    name: i.product.name.clone(),
                    total: unit_price.multiply(i.quantity.value()),
                    unit_price,
                    quantity: i.quantity.value(),
                })
            })
            .collect::<Result<Vec<_>, MoneyError>>()?;
        let subtotal = Money::sum(STORE_CURRENCY, items.iter().map(|i| &i.total))?;
        let amount = subtotal.add(&delivery.price)?;
        let now = Utc::now();
        let mut order = Self {
            id: Uuid::now_v7(),
            order_number: order_number.into(),
            created_at: now,
            updated_at: now,
            customer,
            items,
            subtotal,
            delivery,
            payment: PaymentSummary { method, amount },
            comment: comment.filter(|c| !c.trim().is_empty()),
            status: OrderStatus::Pending,
            events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id,
            order_number: order.order_number.clone(),
            total: order.payment.amount.amount(),
        }));
        Ok(order)
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn customer(&self) -> &ContactDetails { &self.customer }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn delivery(&self) -> &DeliverySummary { &self.delivery }
    pub fn payment(&self) -> &PaymentSummary { &self.payment }
    pub fn total(&self) -> &Money { &self.payment.amount }
    pub fn comment(&self) -> Option<&str> { self.comment.as_deref() }
    pub fn status(&self) -> OrderStatus { self.status }

    pub fn start_processing(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Pending, OrderStatus::Processing)
    }

    pub fn ship(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Processing, OrderStatus::Shipped)
    }

    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Shipped, OrderStatus::Delivered)
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if matches!(self.status, OrderStatus::Delivered | OrderStatus::Cancelled) {
            return Err(OrderError::CannotCancel(self.status));
        }
        self.status = OrderStatus::Cancelled;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Cancelled { order_id: self.id }));
        Ok(())
    }

    fn transition(&mut self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if self.status != from {
            return Err(OrderError::InvalidTransition { from: self.status, to });
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
    #[error("cannot cancel an order that is {0:?}")]
    CannotCancel(OrderStatus),
    #[error("cannot move order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error(transparent)]
    Money(#[from] MoneyError),
}
