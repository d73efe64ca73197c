use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use homegoods_storefront::api::{router, AppState};
use homegoods_storefront::config::Config;
use homegoods_storefront::domain::aggregates::Order;
use homegoods_storefront::notify::{EventPublisher, LogNotifier, NotifyError, OrderNotifier};
use homegoods_storefront::store::{MemoryStore, SessionStore};

struct DownNotifier;

#[async_trait]
impl OrderNotifier for DownNotifier {
    async fn notify(&self, _order: &Order) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected { status: 503, body: "unavailable".into() })
    }
}

/// Takes a while to deliver, like a slow chat bot API.
struct SlowNotifier;

#[async_trait]
impl OrderNotifier for SlowNotifier {
    async fn notify(&self, _order: &Order) -> Result<(), NotifyError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }
}

fn app_with(notifier: Arc<dyn OrderNotifier>) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(&Config::default(), store.clone(), notifier, EventPublisher::default());
    (router(state), store)
}

fn app() -> Router {
    app_with(Arc::new(LogNotifier)).0
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder.header("content-type", "application/json").body(Body::from(b.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn checkout_form(method: &str) -> Value {
    json!({
        "contact": {"first_name": "Anna", "last_name": "Petrova", "email": "anna@example.com", "phone": "+7 900 000-00-00"},
        "delivery": {"type": "delivery", "address": "Lenina 1", "city": "Moscow", "postal_code": "101000", "date": "2024-02-01", "time": "10:00-14:00"},
        "payment_method": method,
        "comment": "Ring twice"
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_product_listing_filters() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/products?category=sachets&sort=price-low&max_price=400", None).await;
    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert!(!products.is_empty());
    assert!(products.iter().all(|p| p["category"] == "sachets" && p["price"]["amount"] == "380"));

    let (status, _) = send(&app, "GET", "/api/v1/products?category=toys", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/v1/products/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_admin_edits_persist() {
    let app = app();
    let (status, _) = send(&app, "PUT", "/api/v1/products/book-001", Some(json!({"name": "Renamed"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/api/v1/products/book-001", None).await;
    assert_eq!(body["name"], "Renamed");

    let (_, mut book) = send(&app, "GET", "/api/v1/products/book-002", None).await;
    let (status, _) = send(&app, "POST", "/api/v1/products", Some(book.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    book["id"] = json!("book-004");
    let (status, _) = send(&app, "POST", "/api/v1/products", Some(book)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stats) = send(&app, "GET", "/api/v1/catalog/stats", None).await;
    assert_eq!(stats["total"], 80);

    let (_, body) = send(&app, "PUT", "/api/v1/catalog/stock", Some(json!({"in_stock": false, "category": "books"}))).await;
    assert_eq!(body["updated"], 4);

    let (_, body) = send(&app, "POST", "/api/v1/catalog/reset", None).await;
    assert_eq!(body["total"], 79);
    let (_, body) = send(&app, "GET", "/api/v1/products/book-001", None).await;
    assert_eq!(body["in_stock"], true);
}

#[tokio::test]
async fn test_cart_lifecycle() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "book-001"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);

    send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "book-001", "quantity": 2}))).await;
    let (_, body) = send(&app, "GET", "/api/v1/cart/s1", None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_price"]["amount"], "2670");

    let (_, body) = send(&app, "PUT", "/api/v1/cart/s1/items/book-001", Some(json!({"quantity": -1}))).await;
    assert_eq!(body["total_items"], 0);

    let (status, _) = send(&app, "DELETE", "/api/v1/cart/s1/items/book-001", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ready_set_adds_components() {
    let app = app();
    let selections = json!({"selections": {"0": "moss-fern", "1": "mint-lemon", "2": "book-002"}});
    let (status, body) = send(&app, "POST", "/api/v1/cart/s1/sets/aroma-reading-set", Some(selections)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["total_price"]["amount"], "2690");

    let (status, _) = send(&app, "POST", "/api/v1/cart/s1/sets/aroma-reading-set", Some(json!({"selections": {"0": "moss-fern"}}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_custom_set_is_one_cart_line() {
    let app = app();
    let items = json!({"items": [
        {"category": "candles", "format_id": "candle-glass-100", "fragrance_id": "ruby-grapefruit", "quantity": 2},
        {"category": "books", "product_id": "book-003"}
    ]});
    let (status, body) = send(&app, "POST", "/api/v1/cart/s1/custom-set", Some(items)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["total_price"]["amount"], "3120");
    assert_eq!(body["items"][0]["product"]["name"], "My custom set");

    let (status, _) = send(&app, "POST", "/api/v1/cart/s1/custom-set", Some(json!({"items": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_configurator_options() {
    let (_, body) = send(&app(), "GET", "/api/v1/configurator/options?category=sachets&format_id=sachet-hearts", None).await;
    assert_eq!(body["formats"].as_array().unwrap().len(), 3);
    assert!(!body["fragrances"].as_array().unwrap().is_empty());
    assert!(body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let (app, store) = app_with(Arc::new(LogNotifier));
    send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "basket-001"}))).await;

    let (status, body) = send(&app, "POST", "/api/v1/checkout/s1", Some(checkout_form("card"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["payment_url"].as_str().unwrap().contains("sum=2890"));
    assert!(store.load_cart("s1").await.unwrap().is_empty());

    let (_, orders) = send(&app, "GET", "/api/v1/orders", None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    let id = body["order"]["id"].as_str().unwrap().to_string();

    let (status, order) = send(&app, "PUT", &format!("/api/v1/orders/{id}/status"), Some(json!({"status": "processing"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "processing");
    let (status, _) = send(&app, "PUT", &format!("/api/v1/orders/{id}/status"), Some(json!({"status": "delivered"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let (status, _) = send(&app(), "POST", "/api/v1/checkout/s1", Some(checkout_form("cash"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notifier_failure_keeps_cart() {
    let (app, store) = app_with(Arc::new(DownNotifier));
    send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "book-001"}))).await;
    let (status, _) = send(&app, "POST", "/api/v1/checkout/s1", Some(checkout_form("cash"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(store.load_cart("s1").await.unwrap().total_items(), 1);
}

#[tokio::test]
async fn test_step_validation_endpoint() {
    let app = app();
    let mut form = checkout_form("cash");
    let (_, body) = send(&app, "POST", "/api/v1/checkout/s1/steps/2", Some(form.clone())).await;
    assert_eq!(body["valid"], true);

    form["delivery"]["city"] = json!("");
    let (_, body) = send(&app, "POST", "/api/v1/checkout/s1/steps/2", Some(form)).await;
    assert_eq!(body["valid"], false);
    assert!(body["error"].as_str().unwrap().starts_with("step 2"));
}

#[tokio::test]
async fn test_wishlist_skips_unknown_products() {
    let (app, store) = app_with(Arc::new(LogNotifier));
    let (status, _) = send(&app, "POST", "/api/v1/wishlist/s1", Some(json!({"product_id": "book-001"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/api/v1/wishlist/s1", Some(json!({"product_id": "book-001"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/api/v1/wishlist/s1", Some(json!({"product_id": "nope"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, "DELETE", "/api/v1/products/book-001", None).await;
    let (_, body) = send(&app, "GET", "/api/v1/wishlist/s1", None).await;
    assert!(body.as_array().unwrap().is_empty());
    assert!(store.load_wishlist("s1").await.unwrap().contains("book-001"));
}

#[tokio::test]
async fn test_delivery_quote_uses_cart_weight() {
    let app = app();
    send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "book-001"}))).await;
    let (status, body) = send(&app, "POST", "/api/v1/delivery/quote", Some(json!({"to_city": 137, "session": "s1"}))).await;
    assert_eq!(status, StatusCode::OK);
    let options = body.as_array().unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0]["tariff_code"], 136);
    assert_eq!(options[0]["period"], "2-4 days");
}

#[tokio::test]
async fn test_ready_sets_and_content() {
    let app = app();
    let (_, sets) = send(&app, "GET", "/api/v1/sets", None).await;
    assert_eq!(sets.as_array().unwrap().len(), 5);
    assert_eq!(sets[0]["discount_percent"], 12);

    let (_, posts) = send(&app, "GET", "/api/v1/blog?tag=organization", None).await;
    assert_eq!(posts.as_array().unwrap().len(), 2);
    let (status, _) = send(&app, "GET", "/api/v1/services/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_large_quantities_are_rejected() {
    let app = app();
    let (status, _) = send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "basket-001", "quantity": 10_000_000}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "basket-001", "quantity": 999}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 999);
    let (status, _) = send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "basket-001"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "PUT", "/api/v1/cart/s1/items/basket-001", Some(json!({"quantity": 3_000_000_000i64}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/api/v1/delivery/quote", Some(json!({"to_city": 137, "session": "s1"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_items_added_during_checkout_stay_in_cart() {
    let (app, store) = app_with(Arc::new(SlowNotifier));
    send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "book-001"}))).await;

    let checkout_app = app.clone();
    let checkout = tokio::spawn(async move { send(&checkout_app, "POST", "/api/v1/checkout/s1", Some(checkout_form("cash"))).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (status, body) = send(&app, "POST", "/api/v1/cart/s1/items", Some(json!({"product_id": "book-002"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 2);

    let (status, receipt) = checkout.await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let ordered = receipt["order"]["items"].as_array().unwrap();
    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0]["product_id"], "book-001");

    let cart = store.load_cart("s1").await.unwrap();
    assert_eq!(cart.total_items(), 1);
    assert!(cart.get("book-002").is_some());
}

#[tokio::test]
async fn test_configured_set_is_one_named_line() {
    let app = app();
    let body = json!({
        "selections": {"0": "sage-sea-salt", "1": "cactus-aloe"},
        "items": [{"category": "books", "product_id": "book-003"}]
    });
    let (status, cart) = send(&app, "POST", "/api/v1/cart/s1/sets/mini-aroma-set/configured", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"]["name"], "Mini Aroma set (configured)");
    assert_eq!(cart["total_items"], 3);
    assert_eq!(cart["total_price"]["amount"], "2350");

    let (status, _) = send(&app, "POST", "/api/v1/cart/s2/sets/mini-aroma-set", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, cart) = send(&app, "GET", "/api/v1/cart/s2", None).await;
    assert_eq!(cart["total_items"], 0);
}

#[tokio::test]
async fn test_matrix_edits_apply_on_regenerate() {
    let app = app();
    let pair = json!({"fragrance_id": "ruby-grapefruit", "format_id": "jar-iron-50"});
    let (status, body) = send(&app, "POST", "/api/v1/matrix/availability", Some(pair)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    let (status, _) = send(&app, "GET", "/api/v1/products/ruby-grapefruit-jar-iron-50", None).await;
    assert_eq!(status, StatusCode::OK);

    let discount = json!({"fragrance_id": "mint-lemon", "format_id": "sachet-clouds", "percent": 10});
    let (status, _) = send(&app, "PUT", "/api/v1/matrix/discount", Some(discount)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "POST", "/api/v1/catalog/regenerate", None).await;
    assert_eq!(body["total"], 78);
    let (status, _) = send(&app, "GET", "/api/v1/products/ruby-grapefruit-jar-iron-50", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, product) = send(&app, "GET", "/api/v1/products/mint-lemon-sachet-clouds", None).await;
    assert_eq!(product["price"]["amount"], "342");
    assert_eq!(product["original_price"]["amount"], "380");
    assert_eq!(product["discount"]["percent"], 10);

    let (status, _) = send(&app, "POST", "/api/v1/matrix/availability", Some(json!({"fragrance_id": "nope", "format_id": "jar-iron-50"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_restores_standard_matrix() {
    let app = app();
    send(&app, "POST", "/api/v1/matrix/availability", Some(json!({"fragrance_id": "ruby-grapefruit", "format_id": "jar-iron-50"}))).await;
    send(&app, "POST", "/api/v1/catalog/regenerate", None).await;

    let (_, body) = send(&app, "POST", "/api/v1/catalog/reset", None).await;
    assert_eq!(body["total"], 79);
    let (_, body) = send(&app, "POST", "/api/v1/catalog/regenerate", None).await;
    assert_eq!(body["total"], 79);
    let (status, _) = send(&app, "GET", "/api/v1/products/ruby-grapefruit-jar-iron-50", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bulk_prices_clear_discounts() {
    let app = app();
    send(&app, "PUT", "/api/v1/matrix/discount", Some(json!({"fragrance_id": "mint-lemon", "format_id": "sachet-clouds", "percent": 10}))).await;
    send(&app, "POST", "/api/v1/catalog/regenerate", None).await;

    let updates = json!([
        {"id": "mint-lemon-sachet-clouds", "price": {"amount": "500", "currency": "RUB"}},
        {"id": "book-001", "price": {"amount": "1000", "currency": "RUB"}},
        {"id": "nope", "price": {"amount": "1", "currency": "RUB"}}
    ]);
    let (status, body) = send(&app, "PUT", "/api/v1/catalog/prices", Some(updates)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (_, product) = send(&app, "GET", "/api/v1/products/mint-lemon-sachet-clouds", None).await;
    assert_eq!(product["price"]["amount"], "500");
    assert!(product.get("original_price").is_none());
    assert!(product.get("discount").is_none());
    let (_, book) = send(&app, "GET", "/api/v1/products/book-001", None).await;
    assert_eq!(book["price"]["amount"], "1000");
}
