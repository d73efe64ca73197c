//! Home-goods storefront HTTP service

use anyhow::Result;
use homegoods_storefront::api::{self, AppState};
use homegoods_storefront::config::Config;
use homegoods_storefront::notify::{BotNotifier, EventPublisher, LogNotifier, OrderNotifier};
use homegoods_storefront::store::{MemoryStore, PgStore, SessionStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::connect(url).await?;
            pg.migrate().await?;
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sessions are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, domain events will only be logged");
                None
            }
        },
        None => None,
    };

    let notifier: Arc<dyn OrderNotifier> = match &config.bot {
        Some(bot) => Arc::new(BotNotifier::new(bot.api_url.clone(), bot.token.clone(), bot.chat_id.clone())),
        None => Arc::new(LogNotifier),
    };

    let state = AppState::new(&config, store, notifier, EventPublisher::new(nats));
    let app = api::router(state);

    tracing::info!("🚀 Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
