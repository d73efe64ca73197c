//! JSON HTTP service.
//!
//! Routes live under `/api/v1`; `GET /health` sits at the root. Sessions are
//! opaque ids chosen by the client and passed in the path.

mod handlers;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::{Catalog, CatalogError, FragranceMatrix, MatrixError};
use crate::checkout::{CheckoutError, CheckoutService, DeliveryEstimator, FlatRateEstimator, PaymentLinkBuilder};
use crate::config::Config;
use crate::configurator::ConfiguratorError;
use crate::domain::aggregates::{CartError, OrderError};
use crate::domain::events::DomainEvent;
use crate::notify::{EventPublisher, OrderNotifier};
use crate::store::{load_catalog_or_default, SessionLocks, SessionStore, StoreError};
use crate::StorefrontError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub matrix: Arc<RwLock<FragranceMatrix>>,
    pub estimator: Arc<dyn DeliveryEstimator>,
    pub checkout: CheckoutService,
    pub events: EventPublisher,
    pub origin_city_code: u32,
    /// Serializes catalog read-modify-write cycles.
    catalog_lock: Arc<Mutex<()>>,
    /// Serializes cart and wishlist read-modify-write cycles per session.
    session_locks: SessionLocks,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn SessionStore>, notifier: Arc<dyn OrderNotifier>, events: EventPublisher) -> Self {
        let payment = PaymentLinkBuilder::new(config.payment_url.clone(), config.payment_shop_id.clone());
        let session_locks = SessionLocks::new();
        let checkout = CheckoutService::new(store.clone(), session_locks.clone(), notifier, payment, events.clone(), config.delivery_pricing());
        Self {
            store,
            matrix: Arc::new(RwLock::new(FragranceMatrix::standard())),
            estimator: Arc::new(FlatRateEstimator),
            checkout,
            events,
            origin_city_code: config.origin_city_code,
            catalog_lock: Arc::new(Mutex::new(())),
            session_locks,
        }
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn DeliveryEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    async fn catalog(&self) -> Result<Catalog, StoreError> {
        let matrix = self.matrix.read().await;
        load_catalog_or_default(self.store.as_ref(), &matrix).await
    }

    /// Saves the edited catalog and publishes what changed.
    async fn commit_catalog(&self, mut catalog: Catalog) -> Result<(), StoreError> {
        self.store.save_catalog(catalog.products()).await?;
        let events = catalog.take_events().into_iter().map(DomainEvent::Catalog).collect();
        self.events.publish(events).await;
        Ok(())
    }
}

/// Builds the axum router (separate from `main` for testing).
pub fn router(state: AppState) -> Router {
    use handlers::*;

    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/categories", get(list_categories))
        .route("/catalog/prices", put(update_prices))
        .route("/catalog/stock", put(update_stock))
        .route("/catalog/stats", get(catalog_stats))
        .route("/catalog/reset", post(reset_catalog))
        .route("/catalog/regenerate", post(regenerate_catalog))
        .route("/fragrances", get(list_fragrances))
        .route("/formats", get(list_formats))
        .route("/matrix/availability", post(toggle_availability))
        .route("/matrix/discount", put(set_matrix_discount))
        .route("/cart/:session", get(get_cart).delete(clear_cart))
        .route("/cart/:session/items", post(add_to_cart))
        .route("/cart/:session/items/:product_id", put(update_cart_item).delete(remove_cart_item))
        .route("/cart/:session/sets/:set_id", post(add_ready_set))
        .route("/cart/:session/sets/:set_id/configured", post(add_configured_set))
        .route("/cart/:session/custom-set", post(add_custom_set))
        .route("/wishlist/:session", get(get_wishlist).post(add_to_wishlist))
        .route("/wishlist/:session/:product_id", axum::routing::delete(remove_from_wishlist))
        .route("/sets", get(list_ready_sets))
        .route("/sets/:id", get(get_ready_set))
        .route("/configurator/options", get(configurator_options))
        .route("/delivery/quote", post(quote_delivery))
        .route("/checkout/:session", post(submit_checkout))
        .route("/checkout/:session/steps/:step", post(validate_checkout_step))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", put(update_order_status))
        .route("/services", get(list_services))
        .route("/services/:id", get(get_service))
        .route("/blog", get(list_blog_posts))
        .route("/blog/:id", get(get_blog_post));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "homegoods-storefront"})) }))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<T, ApiError>;

fn status_for(err: &StorefrontError) -> StatusCode {
    use StorefrontError as E;
    match err {
        E::Catalog(CatalogError::ProductNotFound(_)) | E::Cart(CartError::ItemNotFound(_)) => StatusCode::NOT_FOUND,
        E::Catalog(CatalogError::DuplicateId(_)) => StatusCode::CONFLICT,
        E::Matrix(MatrixError::UnknownFragrance(_) | MatrixError::UnknownFormat(_)) => StatusCode::NOT_FOUND,
        E::Configurator(ConfiguratorError::UnknownSet(_) | ConfiguratorError::ProductNotFound(_)) => StatusCode::NOT_FOUND,
        E::Configurator(ConfiguratorError::Money(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        E::Order(OrderError::CannotCancel(_) | OrderError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        E::Checkout(CheckoutError::Notify(_)) | E::Notify(_) => StatusCode::BAD_GATEWAY,
        E::Checkout(CheckoutError::Store(_) | CheckoutError::PaymentLink(_) | CheckoutError::Money(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        E::Store(_) | E::Money(_) | E::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn reject(err: impl Into<StorefrontError>) -> ApiError {
    let err = err.into();
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, err.to_string())
}
