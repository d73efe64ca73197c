use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{reject, ApiResult, AppState};
use crate::catalog::{CatalogQuery, CatalogStats, CategoryFilter, Format, Fragrance, FragranceMatrix, PriceUpdate};
use crate::checkout::delivery::order_weight;
use crate::checkout::{validate_step, CheckoutForm, CheckoutReceipt, CheckoutStep, DeliveryOption, QuoteRequest};
use crate::configurator::{find_ready_set, ready_sets, ItemChoice, PickerOptions, ReadySet, Selections, SetBuilder, SetOrigin};
use crate::content::{self, BlogPost, Service};
use crate::domain::aggregates::{Cart, CartItem, Category, Order, OrderError, OrderStatus, Product, ProductPatch};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::Money;

// ============================================================================
// Catalog
// ============================================================================

pub async fn list_products(State(s): State<AppState>, Query(q): Query<CatalogQuery>) -> ApiResult<Json<Vec<Product>>> {
    let catalog = s.catalog().await.map_err(reject)?;
    let found = catalog.query(&q).map_err(reject)?;
    Ok(Json(found.into_iter().cloned().collect()))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    let catalog = s.catalog().await.map_err(reject)?;
    catalog.get(&id).cloned().map(Json).ok_or((StatusCode::NOT_FOUND, format!("product not found: {id}")))
}

pub async fn create_product(State(s): State<AppState>, Json(product): Json<Product>) -> ApiResult<(StatusCode, Json<Product>)> {
    let _guard = s.catalog_lock.lock().await;
    let mut catalog = s.catalog().await.map_err(reject)?;
    catalog.add(product.clone()).map_err(reject)?;
    s.commit_catalog(catalog).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(patch): Json<ProductPatch>) -> ApiResult<Json<Product>> {
    let _guard = s.catalog_lock.lock().await;
    let mut catalog = s.catalog().await.map_err(reject)?;
    let product = catalog.update(&id, patch).map_err(reject)?.clone();
    s.commit_catalog(catalog).await.map_err(reject)?;
    Ok(Json(product))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let _guard = s.catalog_lock.lock().await;
    let mut catalog = s.catalog().await.map_err(reject)?;
    catalog.delete(&id).map_err(reject)?;
    s.commit_catalog(catalog).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct Updated {
    updated: usize,
}

pub async fn update_prices(State(s): State<AppState>, Json(updates): Json<Vec<PriceUpdate>>) -> ApiResult<Json<Updated>> {
    let _guard = s.catalog_lock.lock().await;
    let mut catalog = s.catalog().await.map_err(reject)?;
    let updated = catalog.update_prices(&updates);
    s.commit_catalog(catalog).await.map_err(reject)?;
    Ok(Json(Updated { updated }))
}

#[derive(Deserialize)]
pub struct StockUpdate {
    in_stock: bool,
    #[serde(default)]
    category: Option<String>,
}

pub async fn update_stock(State(s): State<AppState>, Json(body): Json<StockUpdate>) -> ApiResult<Json<Updated>> {
    let filter = CategoryFilter::parse(body.category.as_deref().unwrap_or("all")).map_err(reject)?;
    let _guard = s.catalog_lock.lock().await;
    let mut catalog = s.catalog().await.map_err(reject)?;
    let updated = catalog.bulk_update_stock(body.in_stock, filter);
    s.commit_catalog(catalog).await.map_err(reject)?;
    Ok(Json(Updated { updated }))
}

pub async fn catalog_stats(State(s): State<AppState>) -> ApiResult<Json<CatalogStats>> {
    let catalog = s.catalog().await.map_err(reject)?;
    Ok(Json(catalog.stats()))
}

#[derive(Serialize)]
pub struct CatalogSize {
    total: usize,
}

/// Drops admin edits, including matrix availability toggles and pair
/// discounts, and returns to the standard defaults.
pub async fn reset_catalog(State(s): State<AppState>) -> ApiResult<Json<CatalogSize>> {
    let _guard = s.catalog_lock.lock().await;
    let mut catalog = s.catalog().await.map_err(reject)?;
    {
        let mut matrix = s.matrix.write().await;
        *matrix = FragranceMatrix::standard();
        catalog.reset(&matrix);
    }
    s.store.clear_catalog().await.map_err(reject)?;
    let total = catalog.len();
    s.events.publish(catalog.take_events().into_iter().map(DomainEvent::Catalog).collect()).await;
    Ok(Json(CatalogSize { total }))
}

pub async fn regenerate_catalog(State(s): State<AppState>) -> ApiResult<Json<CatalogSize>> {
    let _guard = s.catalog_lock.lock().await;
    let mut catalog = s.catalog().await.map_err(reject)?;
    {
        let matrix = s.matrix.read().await;
        catalog.regenerate_matrix(&matrix);
    }
    let total = catalog.len();
    s.commit_catalog(catalog).await.map_err(reject)?;
    Ok(Json(CatalogSize { total }))
}

#[derive(Serialize)]
pub struct CategoryView {
    id: Category,
    title: &'static str,
    count: usize,
}

pub async fn list_categories(State(s): State<AppState>) -> ApiResult<Json<Vec<CategoryView>>> {
    let stats = s.catalog().await.map_err(reject)?.stats();
    Ok(Json(
        Category::ALL
            .iter()
            .map(|c| CategoryView { id: *c, title: c.title(), count: stats.by_category.get(c).copied().unwrap_or(0) })
            .collect(),
    ))
}

// ============================================================================
// Fragrance matrix
// ============================================================================

pub async fn list_fragrances(State(s): State<AppState>) -> Json<Vec<Fragrance>> {
    Json(s.matrix.read().await.fragrances.clone())
}

pub async fn list_formats(State(s): State<AppState>) -> Json<Vec<Format>> {
    Json(s.matrix.read().await.formats.clone())
}

#[derive(Deserialize)]
pub struct PairRequest {
    fragrance_id: String,
    format_id: String,
    #[serde(default)]
    percent: u8,
}

#[derive(Serialize)]
pub struct Availability {
    available: bool,
}

/// Flips availability of a pair. The catalog picks it up on the next regenerate.
pub async fn toggle_availability(State(s): State<AppState>, Json(req): Json<PairRequest>) -> ApiResult<Json<Availability>> {
    let available = s.matrix.write().await.toggle_availability(&req.fragrance_id, &req.format_id).map_err(reject)?;
    tracing::info!(fragrance = %req.fragrance_id, format = %req.format_id, available, "matrix availability changed");
    Ok(Json(Availability { available }))
}

pub async fn set_matrix_discount(State(s): State<AppState>, Json(req): Json<PairRequest>) -> ApiResult<StatusCode> {
    s.matrix.write().await.set_discount(&req.fragrance_id, &req.format_id, req.percent).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Cart
// ============================================================================

#[derive(Serialize)]
pub struct CartView {
    items: Vec<CartItem>,
    total_price: Money,
    total_items: u32,
}

impl CartView {
    fn of(cart: Cart) -> ApiResult<Self> {
        let total_price = cart.total_price().map_err(reject)?;
        let total_items = cart.total_items();
        Ok(Self { items: cart.items().to_vec(), total_price, total_items })
    }
}

async fn save_cart(s: &AppState, session: &str, cart: Cart) -> ApiResult<Json<CartView>> {
    s.store.save_cart(session, &cart).await.map_err(reject)?;
    CartView::of(cart).map(Json)
}

pub async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<Json<CartView>> {
    let cart = s.store.load_cart(&session).await.map_err(reject)?;
    CartView::of(cart).map(Json)
}

pub async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<StatusCode> {
    let _session = s.session_locks.acquire(&session).await;
    s.store.delete_cart(&session).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

fn one() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct AddItem {
    product_id: String,
    #[serde(default = "one")]
    quantity: u32,
}

pub async fn add_to_cart(State(s): State<AppState>, Path(session): Path<String>, Json(req): Json<AddItem>) -> ApiResult<Json<CartView>> {
    let catalog = s.catalog().await.map_err(reject)?;
    let product = catalog.get(&req.product_id).cloned().ok_or((StatusCode::NOT_FOUND, format!("product not found: {}", req.product_id)))?;
    let _session = s.session_locks.acquire(&session).await;
    let mut cart = s.store.load_cart(&session).await.map_err(reject)?;
    cart.add_quantity(product, req.quantity).map_err(reject)?;
    save_cart(&s, &session, cart).await
}

#[derive(Deserialize)]
pub struct SetQuantity {
    quantity: i64,
}

/// A quantity of zero or below removes the line.
pub async fn update_cart_item(State(s): State<AppState>, Path((session, product_id)): Path<(String, String)>, Json(req): Json<SetQuantity>) -> ApiResult<Json<CartView>> {
    let quantity = u32::try_from(req.quantity.max(0)).unwrap_or(u32::MAX);
    let _session = s.session_locks.acquire(&session).await;
    let mut cart = s.store.load_cart(&session).await.map_err(reject)?;
    cart.update_quantity(&product_id, quantity).map_err(reject)?;
    save_cart(&s, &session, cart).await
}

pub async fn remove_cart_item(State(s): State<AppState>, Path((session, product_id)): Path<(String, String)>) -> ApiResult<Json<CartView>> {
    let _session = s.session_locks.acquire(&session).await;
    let mut cart = s.store.load_cart(&session).await.map_err(reject)?;
    cart.remove(&product_id).map_err(reject)?;
    save_cart(&s, &session, cart).await
}

// ============================================================================
// Wishlist
// ============================================================================

/// Listed products that still exist in the catalog.
pub async fn get_wishlist(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<Json<Vec<Product>>> {
    let wishlist = s.store.load_wishlist(&session).await.map_err(reject)?;
    let catalog = s.catalog().await.map_err(reject)?;
    Ok(Json(wishlist.product_ids().iter().filter_map(|id| catalog.get(id).cloned()).collect()))
}

#[derive(Deserialize)]
pub struct WishlistAdd {
    product_id: String,
}

pub async fn add_to_wishlist(State(s): State<AppState>, Path(session): Path<String>, Json(req): Json<WishlistAdd>) -> ApiResult<StatusCode> {
    if s.catalog().await.map_err(reject)?.get(&req.product_id).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("product not found: {}", req.product_id)));
    }
    let _session = s.session_locks.acquire(&session).await;
    let mut wishlist = s.store.load_wishlist(&session).await.map_err(reject)?;
    if !wishlist.add(req.product_id) {
        return Ok(StatusCode::OK);
    }
    s.store.save_wishlist(&session, &wishlist).await.map_err(reject)?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_from_wishlist(State(s): State<AppState>, Path((session, product_id)): Path<(String, String)>) -> ApiResult<StatusCode> {
    let _session = s.session_locks.acquire(&session).await;
    let mut wishlist = s.store.load_wishlist(&session).await.map_err(reject)?;
    if !wishlist.remove(&product_id) {
        return Err((StatusCode::NOT_FOUND, format!("not in wishlist: {product_id}")));
    }
    s.store.save_wishlist(&session, &wishlist).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Configurator
// ============================================================================

#[derive(Serialize)]
pub struct ReadySetView {
    #[serde(flatten)]
    set: ReadySet,
    discount_percent: u32,
}

impl From<ReadySet> for ReadySetView {
    fn from(set: ReadySet) -> Self {
        Self { discount_percent: set.discount_percent(), set }
    }
}

pub async fn list_ready_sets() -> Json<Vec<ReadySetView>> {
    Json(ready_sets().into_iter().map(ReadySetView::from).collect())
}

pub async fn get_ready_set(Path(id): Path<String>) -> ApiResult<Json<ReadySetView>> {
    find_ready_set(&id).map(|s| Json(s.into())).map_err(reject)
}

#[derive(Deserialize)]
pub struct OptionsQuery {
    category: Category,
    #[serde(default)]
    format_id: Option<String>,
}

#[derive(Serialize)]
pub struct PickerView {
    formats: Vec<Format>,
    fragrances: Vec<Fragrance>,
    products: Vec<Product>,
}

pub async fn configurator_options(State(s): State<AppState>, Query(q): Query<OptionsQuery>) -> ApiResult<Json<PickerView>> {
    let catalog = s.catalog().await.map_err(reject)?;
    let matrix = s.matrix.read().await;
    let options = PickerOptions::new(&catalog, &matrix);
    Ok(Json(PickerView {
        formats: options.formats(q.category).into_iter().cloned().collect(),
        fragrances: q.format_id.as_deref().map(|f| options.fragrances(f).into_iter().cloned().collect()).unwrap_or_default(),
        products: options.products(q.category).into_iter().cloned().collect(),
    }))
}

#[derive(Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    selections: Selections,
    /// Extra picks added on top of the template; configured sets only.
    #[serde(default)]
    items: Vec<ItemChoice>,
}

/// Adds each component of the ready set at catalog price. Extra picks only
/// make sense for a configured set.
pub async fn add_ready_set(State(s): State<AppState>, Path((session, set_id)): Path<(String, String)>, Json(req): Json<SetRequest>) -> ApiResult<Json<CartView>> {
    if !req.items.is_empty() {
        return Err((StatusCode::BAD_REQUEST, format!("extra items are only accepted by /cart/{session}/sets/{set_id}/configured")));
    }
    let set = find_ready_set(&set_id).map_err(reject)?;
    let catalog = s.catalog().await.map_err(reject)?;
    let items = {
        let matrix = s.matrix.read().await;
        set.resolve(&req.selections, &catalog, &matrix).map_err(reject)?
    };
    let _session = s.session_locks.acquire(&session).await;
    let mut cart = s.store.load_cart(&session).await.map_err(reject)?;
    for item in items {
        cart.add_quantity(item.product, item.quantity).map_err(reject)?;
    }
    tracing::info!(%session, set = %set.id, "ready set added to cart");
    save_cart(&s, &session, cart).await
}

pub async fn add_configured_set(State(s): State<AppState>, Path((session, set_id)): Path<(String, String)>, Json(req): Json<SetRequest>) -> ApiResult<Json<CartView>> {
    let set = find_ready_set(&set_id).map_err(reject)?;
    let catalog = s.catalog().await.map_err(reject)?;
    let product = {
        let matrix = s.matrix.read().await;
        let mut builder = set.to_builder(&req.selections, &catalog, &matrix).map_err(reject)?;
        for choice in &req.items {
            let item = choice.resolve(&catalog, &matrix).map_err(reject)?;
            builder.add(item.product, item.quantity).map_err(reject)?;
        }
        builder.into_virtual_product(SetOrigin::Configured(&set)).map_err(reject)?
    };
    let _session = s.session_locks.acquire(&session).await;
    let mut cart = s.store.load_cart(&session).await.map_err(reject)?;
    cart.add(product);
    save_cart(&s, &session, cart).await
}

#[derive(Deserialize)]
pub struct CustomSetRequest {
    items: Vec<ItemChoice>,
}

pub async fn add_custom_set(State(s): State<AppState>, Path(session): Path<String>, Json(req): Json<CustomSetRequest>) -> ApiResult<Json<CartView>> {
    let catalog = s.catalog().await.map_err(reject)?;
    let product = {
        let matrix = s.matrix.read().await;
        let mut builder = SetBuilder::default();
        for choice in &req.items {
            let item = choice.resolve(&catalog, &matrix).map_err(reject)?;
            builder.add(item.product, item.quantity).map_err(reject)?;
        }
        builder.into_virtual_product(SetOrigin::Personal).map_err(reject)?
    };
    let _session = s.session_locks.acquire(&session).await;
    let mut cart = s.store.load_cart(&session).await.map_err(reject)?;
    cart.add(product);
    save_cart(&s, &session, cart).await
}

// ============================================================================
// Delivery & checkout
// ============================================================================

#[derive(Deserialize)]
pub struct QuoteBody {
    to_city: u32,
    /// Weight is taken from this session's cart when not given.
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    weight_grams: Option<u32>,
}

#[derive(Serialize)]
pub struct QuoteView {
    #[serde(flatten)]
    option: DeliveryOption,
    period: String,
}

pub async fn quote_delivery(State(s): State<AppState>, Json(body): Json<QuoteBody>) -> ApiResult<Json<Vec<QuoteView>>> {
    let weight_grams = match (body.weight_grams, &body.session) {
        (Some(w), _) => w,
        (None, Some(session)) => order_weight(&s.store.load_cart(session).await.map_err(reject)?),
        (None, None) => 0,
    };
    let request = QuoteRequest { from_city: s.origin_city_code, to_city: body.to_city, weight_grams };
    let options = s.estimator.quote(&request).await;
    Ok(Json(options.into_iter().map(|option| QuoteView { period: option.period(), option }).collect()))
}

pub async fn submit_checkout(State(s): State<AppState>, Path(session): Path<String>, Json(form): Json<CheckoutForm>) -> ApiResult<(StatusCode, Json<CheckoutReceipt>)> {
    let receipt = s.checkout.submit(&session, &form).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

#[derive(Serialize)]
pub struct StepCheck {
    step: u8,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn validate_checkout_step(Path((_session, step)): Path<(String, u8)>, Json(form): Json<CheckoutForm>) -> ApiResult<Json<StepCheck>> {
    let step = CheckoutStep::from_number(step).ok_or((StatusCode::BAD_REQUEST, format!("unknown checkout step {step}")))?;
    let error = validate_step(&form, step).err().map(|e| e.to_string());
    Ok(Json(StepCheck { step: step.number(), valid: error.is_none(), error }))
}

// ============================================================================
// Orders
// ============================================================================

pub async fn list_orders(State(s): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    s.store.list_orders().await.map(Json).map_err(reject)
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Order>> {
    s.store.load_order(id).await.map_err(reject)?.map(Json).ok_or((StatusCode::NOT_FOUND, format!("order not found: {id}")))
}

#[derive(Deserialize)]
pub struct StatusChange {
    status: OrderStatus,
}

pub async fn update_order_status(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<StatusChange>) -> ApiResult<Json<Order>> {
    let mut order = s.store.load_order(id).await.map_err(reject)?.ok_or((StatusCode::NOT_FOUND, format!("order not found: {id}")))?;
    let changed = match req.status {
        OrderStatus::Processing => order.start_processing(),
        OrderStatus::Shipped => order.ship(),
        OrderStatus::Delivered => order.deliver(),
        OrderStatus::Cancelled => order.cancel(),
        OrderStatus::Pending => Err(OrderError::InvalidTransition { from: order.status(), to: OrderStatus::Pending }),
    };
    changed.map_err(reject)?;
    s.store.save_order(&order).await.map_err(reject)?;
    s.events.publish(order.take_events()).await;
    tracing::info!(order_number = %order.order_number(), status = ?order.status(), "order status changed");
    Ok(Json(order))
}

// ============================================================================
// Content
// ============================================================================

pub async fn list_services() -> Json<Vec<Service>> {
    Json(content::services())
}

pub async fn get_service(Path(id): Path<String>) -> ApiResult<Json<Service>> {
    content::service(&id).map(Json).ok_or((StatusCode::NOT_FOUND, format!("service not found: {id}")))
}

#[derive(Deserialize)]
pub struct BlogQuery {
    #[serde(default)]
    tag: Option<String>,
}

pub async fn list_blog_posts(Query(q): Query<BlogQuery>) -> Json<Vec<BlogPost>> {
    Json(match q.tag.as_deref() {
        Some(tag) => content::blog_posts_tagged(tag),
        None => content::blog_posts(),
    })
}

pub async fn get_blog_post(Path(id): Path<String>) -> ApiResult<Json<BlogPost>> {
    content::blog_post(&id).map(Json).ok_or((StatusCode::NOT_FOUND, format!("post not found: {id}")))
}
