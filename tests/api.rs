use std::sync::Arc;
use std::time::Duration;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use ecoshop::api::{self, AppState};
use ecoshop::{Catalog, MemoryStore, Persistence, Storefront};
use serde_json::{json, Value};
use tower::ServiceExt;

const QUIET: Duration = Duration::from_millis(300);

async fn app_with(persistence: Persistence) -> Router {
    let catalog = Arc::new(Catalog::ecoshop().unwrap());
    let shop = Storefront::open(catalog, persistence).await;
    api::router(AppState::new(shop, QUIET))
}

async fn app() -> Router { app_with(Persistence::in_memory()).await }

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn ids(products: &Value) -> Vec<u64> {
    products.as_array().unwrap().iter().map(|p| p["id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app().await, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_add_to_cart_accumulates_quantity() {
    let app = app().await;
    let (status, _) = send(&app, Method::POST, "/api/v1/cart", Some(json!({"product_id": 1}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, cart) = send(&app, Method::POST, "/api/v1/cart", Some(json!({"product_id": 1, "quantity": 1}))).await;

    assert_eq!(cart["count"], 2);
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["total"]["amount"], "25.98");
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let app = app().await;
    send(&app, Method::POST, "/api/v1/cart", Some(json!({"product_id": 2, "quantity": 3}))).await;
    let (status, cart) = send(&app, Method::PUT, "/api/v1/cart/2", Some(json!({"quantity": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["count"], 0);
    assert!(cart["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/api/v1/cart", Some(json!({"product_id": 999}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));

    let (status, _) = send(&app, Method::POST, "/api/v1/wishlist/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/api/v1/products/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_ids_are_rejected() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/api/v1/products/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send(&app, Method::DELETE, "/api/v1/cart/0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send(&app, Method::POST, "/api/v1/cart", Some(json!({"product_id": 1, "quantity": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_fourth_comparison_conflicts() {
    let app = app().await;
    for id in [1, 2, 3] {
        let (status, body) = send(&app, Method::POST, &format!("/api/v1/comparison/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "added");
    }
    let (status, body) = send(&app, Method::POST, "/api/v1/comparison/4", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You can only compare up to 3 products at a time");

    let (_, body) = send(&app, Method::POST, "/api/v1/comparison/2", None).await;
    assert_eq!(body["action"], "removed");
    assert_eq!(body["items"], json!([1, 3]));
    let (_, view) = send(&app, Method::GET, "/api/v1/comparison", None).await;
    assert_eq!(ids(&view["products"]), vec![1, 3]);
}

#[tokio::test]
async fn test_product_listing_filters_and_sorts() {
    let app = app().await;
    let (_, natural) = send(&app, Method::GET, "/api/v1/products?category=natural", None).await;
    assert_eq!(ids(&natural), vec![1, 4]);

    let (_, cheapest_first) = send(&app, Method::GET, "/api/v1/products?sort=price-low", None).await;
    assert_eq!(ids(&cheapest_first), vec![2, 1, 4, 6, 3, 5]);
    assert_eq!(cheapest_first[0]["display_price"], "$8.50");

    let (status, _) = send(&app, Method::GET, "/api/v1/products?sort=random", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_product_card_flags() {
    let app = app().await;
    send(&app, Method::POST, "/api/v1/wishlist/5", None).await;
    let (_, card) = send(&app, Method::GET, "/api/v1/products/5", None).await;
    assert_eq!(card["in_wishlist"], true);
    assert_eq!(card["in_comparison"], false);
    assert_eq!(card["stock_label"], "5 left");
    assert_eq!(card["eco_stars"], "★★★★★");
}

#[tokio::test]
async fn test_wishlist_add_and_remove() {
    let app = app().await;
    let (_, first) = send(&app, Method::POST, "/api/v1/wishlist/3", None).await;
    let (_, again) = send(&app, Method::POST, "/api/v1/wishlist/3", None).await;
    assert_eq!(first["changed"], true);
    assert_eq!(again["changed"], false);

    let (_, view) = send(&app, Method::GET, "/api/v1/wishlist", None).await;
    assert_eq!(view["count"], 1);

    let (_, removed) = send(&app, Method::DELETE, "/api/v1/wishlist/3", None).await;
    assert_eq!(removed["changed"], true);
    assert_eq!(removed["in_wishlist"], false);
}

#[tokio::test]
async fn test_session_filter_drives_listing() {
    let app = app().await;
    let (status, state) = send(&app, Method::PUT, "/api/v1/filter", Some(json!({"category": "eco", "sort": "price-high"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["category"], "eco");

    let (_, listing) = send(&app, Method::GET, "/api/v1/products", None).await;
    assert_eq!(ids(&listing), vec![3, 6]);

    let (status, _) = send(&app, Method::PUT, "/api/v1/filter", Some(json!({"category": "recycled", "sort": "bogus"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, state) = send(&app, Method::GET, "/api/v1/filter", None).await;
    assert_eq!(state["category"], "eco");
}

#[tokio::test(start_paused = true)]
async fn test_search_applies_after_typing_pauses() {
    let app = app().await;
    for term in ["s", "so", "sol"] {
        let (status, _) = send(&app, Method::POST, "/api/v1/search", Some(json!({"term": term}))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
    let (_, state) = send(&app, Method::GET, "/api/v1/filter", None).await;
    assert_eq!(state["search"], "");

    tokio::time::sleep(QUIET + Duration::from_millis(50)).await;
    let (_, state) = send(&app, Method::GET, "/api/v1/filter", None).await;
    assert_eq!(state["search"], "sol");
    let (_, listing) = send(&app, Method::GET, "/api/v1/products", None).await;
    assert_eq!(ids(&listing), vec![3]);
}

#[tokio::test]
async fn test_suggestions_are_capped() {
    let app = app().await;
    let (_, hits) = send(&app, Method::GET, "/api/v1/search/suggestions?q=e", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 5);
    let (_, none) = send(&app, Method::GET, "/api/v1/search/suggestions?q=", None).await;
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let store = Persistence::new(MemoryStore::new());
    let first = app_with(store.clone()).await;
    send(&first, Method::POST, "/api/v1/cart", Some(json!({"product_id": 6, "quantity": 2}))).await;
    send(&first, Method::POST, "/api/v1/wishlist/4", None).await;

    let second = app_with(store).await;
    let (_, cart) = send(&second, Method::GET, "/api/v1/cart", None).await;
    assert_eq!(cart["count"], 2);
    assert_eq!(cart["lines"][0]["name"], "LED Smart Bulbs");
    let (_, wishlist) = send(&second, Method::GET, "/api/v1/wishlist", None).await;
    assert_eq!(ids(&wishlist["products"]), vec![4]);
}

#[tokio::test]
async fn test_reference_data() {
    let app = app().await;
    let (_, categories) = send(&app, Method::GET, "/api/v1/categories", None).await;
    assert_eq!(categories.as_array().unwrap().len(), 4);
    assert_eq!(categories[0]["id"], "all");
    let (_, testimonials) = send(&app, Method::GET, "/api/v1/testimonials", None).await;
    assert_eq!(testimonials[1]["product"], "Solar Phone Charger");
}
