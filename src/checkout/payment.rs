//! Hosted payment page links.

use reqwest::Url;

use super::CheckoutError;
use crate::domain::aggregates::Order;

#[derive(Clone, Debug)]
pub struct PaymentLinkBuilder {
    base_url: String,
    shop_id: String,
}

impl PaymentLinkBuilder {
    pub fn new(base_url: impl Into<String>, shop_id: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), shop_id: shop_id.into() }
    }

    pub fn link(&self, order: &Order) -> Result<String, CheckoutError> {
        let sum = order.total().amount().normalize().to_string();
        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("shopId", self.shop_id.as_str()),
                ("sum", sum.as_str()),
                ("orderNumber", order.order_number()),
                ("customerEmail", order.customer().email.as_str()),
                ("paymentType", "AC"),
            ],
        )
        .map_err(|e| CheckoutError::PaymentLink(e.to_string()))?;
        Ok(url.into())
    }
}
