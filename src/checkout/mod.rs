//! Checkout: the step-validated form, delivery pricing and order submission.

pub mod delivery;
pub mod payment;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use crate::domain::aggregates::{Cart, ContactDetails, DeliveryKind, DeliverySummary, Order, OrderError, PaymentMethod};
use crate::domain::value_objects::{Money, MoneyError};
use crate::notify::{EventPublisher, NotifyError, OrderNotifier};
use crate::store::{SessionLocks, SessionStore, StoreError};

pub use delivery::{DeliveryEstimator, DeliveryOption, FlatRateEstimator, QuoteRequest};
pub use payment::PaymentLinkBuilder;

pub const PICKUP_ADDRESS: &str = "Pickup point: 15 Tverskaya St, Moscow (daily 10:00-21:00)";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    #[serde(rename = "type", default)]
    pub kind: DeliveryKind,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub contact: ContactDetails,
    pub delivery: DeliveryDetails,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub delivery_option: Option<DeliveryOption>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckoutStep {
    Contact = 1,
    Delivery = 2,
    Payment = 3,
    Review = 4,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 4] = [Self::Contact, Self::Delivery, Self::Payment, Self::Review];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Checks the fields a step owns. The review step has none.
pub fn validate_step(form: &CheckoutForm, step: CheckoutStep) -> Result<(), CheckoutError> {
    let invalid = |reason: String| Err(CheckoutError::InvalidStep { step, reason });
    match step {
        CheckoutStep::Contact => {
            if let Err(errors) = form.contact.validate() {
                let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
                fields.sort_unstable();
                return invalid(format!("invalid contact fields: {}", fields.join(", ")));
            }
            Ok(())
        }
        CheckoutStep::Delivery => {
            let d = &form.delivery;
            match d.kind {
                DeliveryKind::Delivery if blank(&d.address) || blank(&d.city) || blank(&d.date) => {
                    invalid("delivery needs an address, a city and a date".into())
                }
                DeliveryKind::Pickup if blank(&d.date) => invalid("pickup needs a date".into()),
                _ => Ok(()),
            }
        }
        CheckoutStep::Payment => match form.payment_method {
            Some(_) => Ok(()),
            None => invalid("payment method is required".into()),
        },
        CheckoutStep::Review => Ok(()),
    }
}

pub fn validate_all(form: &CheckoutForm) -> Result<(), CheckoutError> {
    CheckoutStep::ALL.into_iter().try_for_each(|step| validate_step(form, step))
}

/// Home-delivery pricing when no carrier option was chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryPricing {
    pub free_threshold: Money,
    pub flat_price: Money,
}

impl Default for DeliveryPricing {
    fn default() -> Self {
        Self { free_threshold: Money::rub(2000), flat_price: Money::rub(300) }
    }
}

pub fn delivery_price(form: &CheckoutForm, subtotal: &Money, pricing: &DeliveryPricing) -> Money {
    if let Some(option) = &form.delivery_option {
        return option.price.clone();
    }
    if form.delivery.kind == DeliveryKind::Delivery && subtotal.amount() < pricing.free_threshold.amount() {
        return pricing.flat_price.clone();
    }
    Money::rub(Decimal::ZERO)
}

pub fn delivery_address(details: &DeliveryDetails) -> String {
    match details.kind {
        DeliveryKind::Delivery => format!("{}, {}, {}", details.city, details.address, details.postal_code),
        DeliveryKind::Pickup => PICKUP_ADDRESS.to_string(),
    }
}

/// `ORD-` followed by eight random digits.
pub fn generate_order_number() -> String {
    format!("ORD-{:08}", rand::thread_rng().gen_range(0..100_000_000u32))
}

/// Validates `form` and snapshots `cart` into a pending order.
pub fn build_order(form: &CheckoutForm, cart: &Cart, pricing: &DeliveryPricing, order_number: String) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    validate_all(form)?;
    let method = form.payment_method.ok_or_else(|| CheckoutError::InvalidStep { step: CheckoutStep::Payment, reason: "payment method is required".into() })?;
    let subtotal = cart.total_price()?;
    let delivery = DeliverySummary {
        kind: form.delivery.kind,
        address: delivery_address(&form.delivery),
        date: form.delivery.date.clone(),
        time: form.delivery.time.clone(),
        price: delivery_price(form, &subtotal, pricing),
    };
    Ok(Order::place(order_number, form.contact.clone(), cart, delivery, method, form.comment.clone())?)
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

/// Attempts at drawing an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Turns a session's cart into a placed order.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
    notifier: Arc<dyn OrderNotifier>,
    payment: PaymentLinkBuilder,
    events: EventPublisher,
    pricing: DeliveryPricing,
}

impl CheckoutService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        locks: SessionLocks,
        notifier: Arc<dyn OrderNotifier>,
        payment: PaymentLinkBuilder,
        events: EventPublisher,
        pricing: DeliveryPricing,
    ) -> Self {
        Self { store, locks, notifier, payment, events, pricing }
    }

    pub fn pricing(&self) -> &DeliveryPricing {
        &self.pricing
    }

    /// The order is stored before staff are notified and removed again when
    /// the notification fails. Only the ordered lines leave the cart; anything
    /// added while the checkout ran stays.
    pub async fn submit(&self, session: &str, form: &CheckoutForm) -> Result<CheckoutReceipt, CheckoutError> {
        let ordered = {
            let _cart = self.locks.acquire(session).await;
            self.store.load_cart(session).await?
        };
        let (mut order, payment_url) = self.record(form, &ordered).await?;

        if let Err(e) = self.notifier.notify(&order).await {
            tracing::error!(order_number = %order.order_number(), error = %e, "checkout aborted, notification failed");
            if let Err(cleanup) = self.store.delete_order(order.id()).await {
                tracing::error!(order_number = %order.order_number(), error = %cleanup, "unnotified order left in store");
            }
            return Err(e.into());
        }

        self.events.publish(order.take_events()).await;
        {
            let _cart = self.locks.acquire(session).await;
            let mut cart = self.store.load_cart(session).await?;
            cart.remove_ordered(&ordered);
            if cart.is_empty() {
                self.store.delete_cart(session).await?;
            } else {
                self.store.save_cart(session, &cart).await?;
            }
        }
        tracing::info!(order_number = %order.order_number(), total = %order.total(), "order placed");
        Ok(CheckoutReceipt { order, payment_url })
    }

    /// Builds the order and its payment link and stores the order, drawing a
    /// fresh order number when the drawn one is taken.
    async fn record(&self, form: &CheckoutForm, cart: &Cart) -> Result<(Order, Option<String>), CheckoutError> {
        let mut attempt = 1;
        loop {
            let order = build_order(form, cart, &self.pricing, generate_order_number())?;
            let payment_url = match order.payment().method {
                PaymentMethod::Card => Some(self.payment.link(&order)?),
                PaymentMethod::Cash | PaymentMethod::Transfer => None,
            };
            match self.store.save_order(&order).await {
                Ok(()) => return Ok((order, payment_url)),
                Err(StoreError::DuplicateOrderNumber(number)) if attempt < ORDER_NUMBER_ATTEMPTS => {
                    tracing::warn!(order_number = %number, attempt, "order number taken, drawing another");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("step {} is incomplete: {reason}", .step.number())]
    InvalidStep { step: CheckoutStep, reason: String },
    #[error("payment link: {0}")]
    PaymentLink(String),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{sample, Category};
    use crate::domain::aggregates::OrderStatus;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn form() -> CheckoutForm {
        CheckoutForm {
            contact: ContactDetails { first_name: "Anna".into(), last_name: "Petrova".into(), email: "anna@example.com".into(), phone: "+7 900".into() },
            delivery: DeliveryDetails {
                kind: DeliveryKind::Delivery,
                address: "Lenina 1".into(),
                city: "Moscow".into(),
                postal_code: "101000".into(),
                date: "2024-02-01".into(),
                time: "10:00-14:00".into(),
            },
            payment_method: Some(PaymentMethod::Card),
            comment: None,
            delivery_option: None,
        }
    }

    fn cart_worth(price: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add(sample("book-001", Category::Books, price));
        cart
    }

    #[test]
    fn test_step_validation() {
        let mut f = form();
        assert!(validate_all(&f).is_ok());

        f.contact.email = "not-an-email".into();
        assert!(matches!(validate_step(&f, CheckoutStep::Contact), Err(CheckoutError::InvalidStep { step: CheckoutStep::Contact, .. })));

        f = form();
        f.delivery.city.clear();
        assert!(validate_step(&f, CheckoutStep::Delivery).is_err());
        f.delivery.kind = DeliveryKind::Pickup;
        assert!(validate_step(&f, CheckoutStep::Delivery).is_ok());
        f.delivery.date.clear();
        assert!(validate_step(&f, CheckoutStep::Delivery).is_err());

        f.payment_method = None;
        assert!(validate_step(&f, CheckoutStep::Payment).is_err());
        assert!(validate_step(&f, CheckoutStep::Review).is_ok());
        assert_eq!(CheckoutStep::from_number(3), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::from_number(5), None);
    }

    #[test]
    fn test_delivery_price_rules() {
        let pricing = DeliveryPricing::default();
        let mut f = form();
        assert_eq!(delivery_price(&f, &Money::rub(1999), &pricing), Money::rub(300));
        assert!(delivery_price(&f, &Money::rub(2000), &pricing).is_zero());

        f.delivery.kind = DeliveryKind::Pickup;
        assert!(delivery_price(&f, &Money::rub(100), &pricing).is_zero());

        f.delivery_option = Some(DeliveryOption { tariff_code: 137, name: "door".into(), price: Money::rub(450), min_days: 1, max_days: 3 });
        assert_eq!(delivery_price(&f, &Money::rub(100), &pricing), Money::rub(450));
    }

    #[test]
    fn test_delivery_address() {
        let mut d = form().delivery;
        assert_eq!(delivery_address(&d), "Moscow, Lenina 1, 101000");
        d.kind = DeliveryKind::Pickup;
        assert_eq!(delivery_address(&d), PICKUP_ADDRESS);
    }

    #[test]
    fn test_build_order() {
        let order = build_order(&form(), &cart_worth(890), &DeliveryPricing::default(), "ORD-00000001".into()).unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total(), &Money::rub(1190));
        assert_eq!(order.delivery().address, "Moscow, Lenina 1, 101000");
        assert!(matches!(build_order(&form(), &Cart::new(), &DeliveryPricing::default(), "x".into()), Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_order_number_shape() {
        let n = generate_order_number();
        assert!(n.starts_with("ORD-"));
        assert_eq!(n.len(), 12);
        assert!(n[4..].chars().all(|c| c.is_ascii_digit()));
    }

    struct FailingNotifier;

    #[async_trait]
    impl OrderNotifier for FailingNotifier {
        async fn notify(&self, _order: &Order) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("down".into()))
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl OrderNotifier for CountingNotifier {
        async fn notify(&self, _order: &Order) -> Result<(), NotifyError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn service_with(store: Arc<MemoryStore>, notifier: Arc<dyn OrderNotifier>, payment_url: &str) -> CheckoutService {
        CheckoutService::new(store, SessionLocks::new(), notifier, PaymentLinkBuilder::new(payment_url, "shop-1"), EventPublisher::default(), DeliveryPricing::default())
    }

    fn service(store: Arc<MemoryStore>, notifier: Arc<dyn OrderNotifier>) -> CheckoutService {
        service_with(store, notifier, "https://pay.example.com/pay")
    }

    #[tokio::test]
    async fn test_submit_clears_cart_and_links_payment() {
        let store = Arc::new(MemoryStore::new());
        store.save_cart("s1", &cart_worth(2500)).await.unwrap();
        let receipt = service(store.clone(), Arc::new(crate::notify::LogNotifier)).submit("s1", &form()).await.unwrap();

        let url = receipt.payment_url.unwrap();
        assert!(url.starts_with("https://pay.example.com/pay?shopId=shop-1&sum=2500&orderNumber=ORD-"));
        assert!(url.ends_with("&customerEmail=anna%40example.com&paymentType=AC"));
        assert!(store.load_cart("s1").await.unwrap().is_empty());
        assert!(store.load_order(receipt.order.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_notifier_failure_keeps_cart() {
        let store = Arc::new(MemoryStore::new());
        store.save_cart("s1", &cart_worth(500)).await.unwrap();
        let err = service(store.clone(), Arc::new(FailingNotifier)).submit("s1", &form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Notify(_)));
        assert_eq!(store.load_cart("s1").await.unwrap().total_items(), 1);
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_payment_url_fails_before_notifying() {
        let store = Arc::new(MemoryStore::new());
        store.save_cart("s1", &cart_worth(500)).await.unwrap();
        let notifier = Arc::new(CountingNotifier::default());
        let err = service_with(store.clone(), notifier.clone(), "not a url").submit("s1", &form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentLink(_)));
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);
        assert!(store.list_orders().await.unwrap().is_empty());
        assert_eq!(store.load_cart("s1").await.unwrap().total_items(), 1);
    }

    #[tokio::test]
    async fn test_cash_has_no_payment_link() {
        let store = Arc::new(MemoryStore::new());
        store.save_cart("s1", &cart_worth(500)).await.unwrap();
        let mut f = form();
        f.payment_method = Some(PaymentMethod::Cash);
        let receipt = service(store, Arc::new(crate::notify::LogNotifier)).submit("s1", &f).await.unwrap();
        assert!(receipt.payment_url.is_none());
    }
}
