//! Order notifications and domain event publishing.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::aggregates::{DeliveryKind, Order};
use crate::domain::events::DomainEvent;

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn notify(&self, order: &Order) -> Result<(), NotifyError>;
}

/// Markdown message sent to the shop's staff chat.
pub fn format_order_message(order: &Order) -> String {
    let customer = order.customer();
    let delivery = order.delivery();
    let payment = order.payment();

    let mut msg = format!("🛍 *New order {}*\n\n", order.order_number());
    msg.push_str("👤 *Customer:*\n");
    msg.push_str(&format!("Name: {}\n", customer.full_name()));
    msg.push_str(&format!("Email: {}\n", customer.email));
    msg.push_str(&format!("Phone: {}\n\n", customer.phone));

    msg.push_str("📦 *Items:*\n");
    for (idx, item) in order.items().iter().enumerate() {
        msg.push_str(&format!("{}. {}\n   Qty: {} × {} = {}\n", idx + 1, item.name, item.quantity, item.unit_price, item.total));
    }

    let kind = match delivery.kind {
        DeliveryKind::Delivery => "Home delivery",
        DeliveryKind::Pickup => "Pickup",
    };
    msg.push_str("\n🚚 *Delivery:*\n");
    msg.push_str(&format!("Type: {kind}\n"));
    msg.push_str(&format!("Address: {}\n", delivery.address));
    msg.push_str(&format!("Date: {} {}\n", delivery.date, delivery.time));
    msg.push_str(&format!("Price: {}\n\n", delivery.price));

    msg.push_str("💳 *Payment:*\n");
    msg.push_str(&format!("Method: {}\n", payment.method.label()));
    msg.push_str(&format!("Subtotal: {}\n", order.subtotal()));
    msg.push_str(&format!("*Total: {}*\n", payment.amount));

    if let Some(comment) = order.comment() {
        msg.push_str(&format!("\n💬 *Comment:*\n{comment}\n"));
    }
    msg.push_str(&format!("\n⏰ {}", order.created_at().format("%Y-%m-%d %H:%M UTC")));
    msg
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
}

/// Posts order messages through a chat bot HTTP API.
#[derive(Clone)]
pub struct BotNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl BotNotifier {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_url: api_url.into(), token: token.into(), chat_id: chat_id.into() }
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url.trim_end_matches('/'), self.token)
    }
}

#[async_trait]
impl OrderNotifier for BotNotifier {
    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        let body = SendMessage { chat_id: &self.chat_id, text: format_order_message(order), parse_mode: "Markdown" };
        let resp = self.client.post(self.endpoint()).json(&body).send().await.map_err(|e| NotifyError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(order_number = %order.order_number(), %status, "order notification rejected");
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }
        tracing::info!(order_number = %order.order_number(), "order notification sent");
        Ok(())
    }
}

/// Writes the message to the log; used when no bot is configured.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        tracing::info!(order_number = %order.order_number(), message = %format_order_message(order), "order placed");
        Ok(())
    }
}

/// Publishes domain events to NATS, or logs them when NATS is not configured.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    /// Delivery is best effort: failures are logged, never returned.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let subject = event.subject();
            let payload = match serde_json::to_vec(&event) {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(%subject, error = %e, "event serialization failed");
                    continue;
                }
            };
            match &self.nats {
                Some(client) => {
                    if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                        tracing::warn!(%subject, error = %e, "event publish failed");
                    }
                }
                None => tracing::debug!(%subject, "domain event"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),
    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{sample, Category};
    use crate::domain::aggregates::{Cart, ContactDetails, DeliverySummary, PaymentMethod};
    use crate::domain::value_objects::Money;

    fn order(comment: Option<String>) -> Order {
        let mut cart = Cart::new();
        cart.add_quantity(sample("book-001", Category::Books, 890), 2).unwrap();
        let customer = ContactDetails { first_name: "Anna".into(), last_name: "Petrova".into(), email: "anna@example.com".into(), phone: "+7 900 000-00-00".into() };
        let delivery = DeliverySummary { kind: DeliveryKind::Pickup, address: "Store".into(), date: "2024-02-01".into(), time: "12:00".into(), price: Money::rub(0) };
        Order::place("ORD-00000042", customer, &cart, delivery, PaymentMethod::Cash, comment).unwrap()
    }

    #[test]
    fn test_message_lists_order() {
        let msg = format_order_message(&order(Some("Gift wrap please".into())));
        assert!(msg.contains("New order ORD-00000042"));
        assert!(msg.contains("Name: Anna Petrova"));
        assert!(msg.contains("1. Product book-001"));
        assert!(msg.contains("Qty: 2 × 890 RUB = 1780 RUB"));
        assert!(msg.contains("Type: Pickup"));
        assert!(msg.contains("Method: Cash"));
        assert!(msg.contains("Gift wrap please"));
    }

    #[test]
    fn test_message_without_comment() {
        assert!(!format_order_message(&order(None)).contains("Comment"));
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        assert!(LogNotifier.notify(&order(None)).await.is_ok());
        EventPublisher::default().publish(vec![]).await;
    }

    #[test]
    fn test_bot_endpoint() {
        let bot = BotNotifier::new("https://api.telegram.org/", "123:abc", "42");
        assert_eq!(bot.endpoint(), "https://api.telegram.org/bot123:abc/sendMessage");
    }
}
