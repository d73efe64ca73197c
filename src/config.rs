//! Runtime configuration read from the environment (`.env` is loaded by `main`).

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::checkout::DeliveryPricing;
use crate::domain::value_objects::Money;

/// Chat bot credentials. Notifications go to the log when absent.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub api_url: String,
    pub token: String,
    pub chat_id: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// In-memory storage when unset.
    pub database_url: Option<String>,
    pub nats_url: Option<String>,
    pub bot: Option<BotConfig>,
    pub payment_url: String,
    pub payment_shop_id: String,
    pub free_delivery_threshold: Decimal,
    pub flat_delivery_price: Decimal,
    pub origin_city_code: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8083,
            database_url: None,
            nats_url: None,
            bot: None,
            payment_url: "https://yoomoney.ru/eshop.xml".to_string(),
            payment_shop_id: "demo-shop".to_string(),
            free_delivery_threshold: Decimal::from(2000),
            flat_delivery_price: Decimal::from(300),
            origin_city_code: 44,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let bot = match (get("BOT_TOKEN"), get("BOT_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(BotConfig {
                api_url: get("BOT_API_URL").unwrap_or_else(|| "https://api.telegram.org".to_string()),
                token,
                chat_id,
            }),
            _ => None,
        };
        Ok(Self {
            port: parse(&get, "PORT", defaults.port)?,
            database_url: get("DATABASE_URL"),
            nats_url: get("NATS_URL"),
            bot,
            payment_url: get("PAYMENT_URL").unwrap_or(defaults.payment_url),
            payment_shop_id: get("PAYMENT_SHOP_ID").unwrap_or(defaults.payment_shop_id),
            free_delivery_threshold: parse(&get, "FREE_DELIVERY_THRESHOLD", defaults.free_delivery_threshold)?,
            flat_delivery_price: parse(&get, "FLAT_DELIVERY_PRICE", defaults.flat_delivery_price)?,
            origin_city_code: parse(&get, "ORIGIN_CITY_CODE", defaults.origin_city_code)?,
        })
    }

    pub fn delivery_pricing(&self) -> DeliveryPricing {
        DeliveryPricing { free_threshold: Money::rub(self.free_delivery_threshold), flat_price: Money::rub(self.flat_delivery_price) }
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.port, 8083);
        assert!(c.database_url.is_none());
        assert!(c.bot.is_none());
        assert_eq!(c.delivery_pricing(), DeliveryPricing::default());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[("PORT", "9000"), ("BOT_TOKEN", "t"), ("BOT_CHAT_ID", "1"), ("FLAT_DELIVERY_PRICE", "350"), ("DATABASE_URL", " ")]).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.bot.unwrap().api_url, "https://api.telegram.org");
        assert_eq!(c.flat_delivery_price, Decimal::from(350));
        assert!(c.database_url.is_none());
    }

    #[test]
    fn test_invalid_number() {
        assert_eq!(config(&[("PORT", "eighty")]).unwrap_err(), ConfigError::Invalid { key: "PORT", value: "eighty".into() });
    }
}
