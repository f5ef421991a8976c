//! Domain events
//!
//! Raised by the aggregates on every state change and drained by the
//! storefront controller, which persists and forwards them as UI-sync
//! notifications.
use crate::domain::value_objects::ProductId;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Wishlist(WishlistEvent),
    Comparison(ComparisonEvent),
    Filter(FilterEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { product_id: ProductId, quantity: u32 },
    QuantityUpdated { product_id: ProductId, quantity: u32 },
    ItemRemoved { product_id: ProductId },
    Cleared,
    Restored { lines: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WishlistEvent {
    Added { product_id: ProductId },
    Removed { product_id: ProductId },
    Restored { items: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComparisonEvent {
    Added { product_id: ProductId },
    Removed { product_id: ProductId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterEvent {
    Changed,
}
