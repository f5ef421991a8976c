//! JSON-over-HTTP presentation adapter.
//!
//! Parses and validates raw user input, turns it into typed [`Command`]s for
//! the [`Storefront`], and returns fresh snapshots for re-rendering. It keeps
//! no session state of its own.

use std::sync::Arc;
use std::time::Duration;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::{Validate, ValidationErrors};
use crate::debounce::Debouncer;
use crate::domain::aggregates::{Product, StockStatus, Toggle};
use crate::domain::catalog::{CategoryInfo, Testimonial};
use crate::domain::filter::{self, CategoryFilter, FilterError, FilterState, SortKey};
use crate::domain::value_objects::{ProductId, ProductIdError};
use crate::storefront::{CartSummary, Command, Outcome, Storefront};
use crate::StoreError;

#[derive(Clone)]
pub struct AppState {
    pub shop: Arc<Mutex<Storefront>>,
    search: Debouncer<String>,
}

impl AppState {
    /// Wraps the storefront and starts the search debouncer. Needs a running tokio runtime.
    pub fn new(shop: Storefront, search_quiet: Duration) -> Self {
        let shop = Arc::new(Mutex::new(shop));
        let for_search = shop.clone();
        let search = Debouncer::spawn(search_quiet, move |term: String| {
            let shop = for_search.clone();
            async move {
                if let Err(e) = shop.lock().await.dispatch(Command::SetSearch(term)).await {
                    tracing::warn!(error = %e, "debounced search failed");
                }
            }
        });
        Self { shop, search }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "ecoshop"})) }))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/testimonials", get(list_testimonials))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/:id", put(update_cart_item).delete(remove_cart_item))
        .route("/api/v1/wishlist", get(get_wishlist))
        .route("/api/v1/wishlist/:id", post(add_to_wishlist).delete(remove_from_wishlist))
        .route("/api/v1/comparison", get(get_comparison))
        .route("/api/v1/comparison/:id", post(toggle_comparison))
        .route("/api/v1/filter", get(get_filter).put(update_filter))
        .route("/api/v1/search", post(push_search))
        .route("/api/v1/search/suggestions", get(search_suggestions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Validation(ValidationErrors),
}

impl From<StoreError> for ApiError { fn from(e: StoreError) -> Self { Self::Store(e) } }
impl From<ProductIdError> for ApiError { fn from(e: ProductIdError) -> Self { Self::Store(e.into()) } }
impl From<FilterError> for ApiError { fn from(e: FilterError) -> Self { Self::Store(e.into()) } }
impl From<ValidationErrors> for ApiError { fn from(e: ValidationErrors) -> Self { Self::Validation(e) } }

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::Store(e) => {
                let status = match &e {
                    StoreError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::ComparisonFull => StatusCode::CONFLICT,
                    StoreError::InvalidQuantity | StoreError::InvalidProductId(_) | StoreError::InvalidFilter(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                };
                (status, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    #[serde(flatten)]
    pub product: Product,
    pub display_price: String,
    pub stock_status: StockStatus,
    pub stock_label: String,
    pub eco_stars: String,
    pub in_wishlist: bool,
    pub in_comparison: bool,
}

impl ProductCard {
    fn new(shop: &Storefront, product: &Product) -> Self {
        let stock_status = product.stock_status();
        Self {
            display_price: product.price().to_string(),
            stock_label: stock_status.label(),
            stock_status,
            eco_stars: product.eco_rating().stars(),
            in_wishlist: shop.is_in_wishlist(product.id()),
            in_comparison: shop.comparison().contains(&product.id()),
            product: product.clone(),
        }
    }
}

fn cards<'a>(shop: &Storefront, products: impl IntoIterator<Item = &'a Product>) -> Vec<ProductCard> {
    products.into_iter().map(|p| ProductCard::new(shop, p)).collect()
}

#[derive(Debug, Serialize)]
pub struct WishlistView { pub count: usize, pub products: Vec<ProductCard> }

#[derive(Debug, Serialize)]
pub struct ComparisonView { pub products: Vec<ProductCard> }

#[derive(Debug, Serialize)]
pub struct ToggleView { pub action: &'static str, pub items: Vec<ProductId> }

#[derive(Debug, Serialize)]
pub struct WishlistChange { pub product_id: ProductId, pub changed: bool, pub in_wishlist: bool }

// =============================================================================
// Catalog
// =============================================================================

async fn list_categories(State(s): State<AppState>) -> Json<Vec<CategoryInfo>> {
    Json(s.shop.lock().await.catalog().categories().to_vec())
}

async fn list_testimonials(State(s): State<AppState>) -> Json<Vec<Testimonial>> {
    Json(s.shop.lock().await.catalog().testimonials().to_vec())
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery { pub category: Option<String>, pub search: Option<String>, pub sort: Option<String> }

/// Lists products under the session filter, with any query parameter overriding it for this request only.
async fn list_products(State(s): State<AppState>, Query(q): Query<ProductQuery>) -> ApiResult<Vec<ProductCard>> {
    let shop = s.shop.lock().await;
    let mut state = shop.filter_state().clone();
    if let Some(category) = q.category.as_deref() { state.category = category.parse::<CategoryFilter>()?; }
    if let Some(sort) = q.sort.as_deref() { state.sort = sort.parse::<SortKey>()?; }
    if let Some(search) = q.search { state.search = search; }
    let products = filter::filter_products(shop.catalog(), &state);
    Ok(Json(cards(&shop, products)))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<ProductCard> {
    let id = ProductId::parse(&id)?;
    let shop = s.shop.lock().await;
    let product = shop.catalog().get(id).ok_or(StoreError::ProductNotFound(id))?;
    Ok(Json(ProductCard::new(&shop, product)))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(range(min = 1))]
    pub product_id: u32,
    #[validate(range(min = 1, max = 999))]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(max = 999))]
    pub quantity: i64,
}

async fn get_cart(State(s): State<AppState>) -> Json<CartSummary> {
    Json(s.shop.lock().await.cart_summary())
}

async fn add_to_cart(State(s): State<AppState>, Json(r): Json<AddToCartRequest>) -> Result<(StatusCode, Json<CartSummary>), ApiError> {
    r.validate()?;
    let product_id = ProductId::new(r.product_id)?;
    let mut shop = s.shop.lock().await;
    shop.dispatch(Command::AddToCart { product_id, quantity: r.quantity.unwrap_or(1) }).await?;
    Ok((StatusCode::CREATED, Json(shop.cart_summary())))
}

async fn update_cart_item(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<UpdateQuantityRequest>) -> ApiResult<CartSummary> {
    r.validate()?;
    let product_id = ProductId::parse(&id)?;
    let mut shop = s.shop.lock().await;
    shop.dispatch(Command::UpdateQuantity { product_id, quantity: r.quantity }).await?;
    Ok(Json(shop.cart_summary()))
}

async fn remove_cart_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<CartSummary> {
    let product_id = ProductId::parse(&id)?;
    let mut shop = s.shop.lock().await;
    shop.dispatch(Command::RemoveFromCart { product_id }).await?;
    Ok(Json(shop.cart_summary()))
}

async fn clear_cart(State(s): State<AppState>) -> ApiResult<CartSummary> {
    let mut shop = s.shop.lock().await;
    shop.dispatch(Command::ClearCart).await?;
    Ok(Json(shop.cart_summary()))
}

// =============================================================================
// Wishlist & comparison
// =============================================================================

fn wishlist_view(shop: &Storefront) -> WishlistView {
    WishlistView { count: shop.wishlist().len(), products: cards(shop, shop.wishlist_products()) }
}

async fn get_wishlist(State(s): State<AppState>) -> Json<WishlistView> {
    Json(wishlist_view(&*s.shop.lock().await))
}

async fn add_to_wishlist(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<WishlistChange> {
    let product_id = ProductId::parse(&id)?;
    let mut shop = s.shop.lock().await;
    let changed = match shop.dispatch(Command::AddToWishlist { product_id }).await? {
        Outcome::WishlistAdded(added) => added,
        _ => false,
    };
    Ok(Json(WishlistChange { product_id, changed, in_wishlist: shop.is_in_wishlist(product_id) }))
}

async fn remove_from_wishlist(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<WishlistChange> {
    let product_id = ProductId::parse(&id)?;
    let mut shop = s.shop.lock().await;
    let changed = matches!(
        shop.dispatch(Command::RemoveFromWishlist { product_id }).await?,
        Outcome::Applied { changed: true }
    );
    Ok(Json(WishlistChange { product_id, changed, in_wishlist: shop.is_in_wishlist(product_id) }))
}

async fn get_comparison(State(s): State<AppState>) -> Json<ComparisonView> {
    let shop = s.shop.lock().await;
    Json(ComparisonView { products: cards(&shop, shop.comparison_products()) })
}

async fn toggle_comparison(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<ToggleView> {
    let product_id = ProductId::parse(&id)?;
    let mut shop = s.shop.lock().await;
    let action = match shop.dispatch(Command::ToggleComparison { product_id }).await? {
        Outcome::Compared(Toggle::Removed) => "removed",
        _ => "added",
    };
    Ok(Json(ToggleView { action, items: shop.comparison().to_vec() }))
}

// =============================================================================
// Filter & search
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct FilterUpdate { pub category: Option<String>, pub sort: Option<String> }

async fn get_filter(State(s): State<AppState>) -> Json<FilterState> {
    Json(s.shop.lock().await.filter_state().clone())
}

async fn update_filter(State(s): State<AppState>, Json(r): Json<FilterUpdate>) -> ApiResult<FilterState> {
    // Both fields parse before either is applied.
    let category = r.category.as_deref().map(str::parse::<CategoryFilter>).transpose()?;
    let sort = r.sort.as_deref().map(str::parse::<SortKey>).transpose()?;
    let mut shop = s.shop.lock().await;
    if let Some(category) = category { shop.dispatch(Command::SetCategory(category)).await?; }
    if let Some(sort) = sort { shop.dispatch(Command::SetSort(sort)).await?; }
    Ok(Json(shop.filter_state().clone()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchInput {
    #[validate(length(max = 200))]
    pub term: String,
}

/// Accepts a keystroke-level search update; it is applied once typing pauses.
async fn push_search(State(s): State<AppState>, Json(r): Json<SearchInput>) -> Result<StatusCode, ApiError> {
    r.validate()?;
    if !s.search.push(r.term) {
        tracing::warn!("search debouncer stopped, input dropped");
    }
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery { pub q: Option<String> }

async fn search_suggestions(State(s): State<AppState>, Query(q): Query<SuggestionQuery>) -> Json<Vec<ProductCard>> {
    let shop = s.shop.lock().await;
    let term = q.q.unwrap_or_default();
    Json(cards(&shop, shop.suggestions(&term)))
}
