//! Wishlist Aggregate

use std::collections::BTreeSet;
use crate::domain::events::{DomainEvent, WishlistEvent};
use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, Default)]
pub struct Wishlist {
    items: BTreeSet<ProductId>,
    events: Vec<DomainEvent>,
}

impl Wishlist {
    pub fn new() -> Self { Self::default() }

    pub fn restore(ids: impl IntoIterator<Item = ProductId>) -> Self {
        let mut wishlist = Self { items: ids.into_iter().collect(), events: vec![] };
        let items = wishlist.items.len();
        wishlist.raise_event(WishlistEvent::Restored { items });
        wishlist
    }

    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn contains(&self, product_id: ProductId) -> bool { self.items.contains(&product_id) }

    /// Snapshot in ascending id order, the shape that gets persisted.
    pub fn ids(&self) -> Vec<ProductId> { self.items.iter().copied().collect() }

    /// Returns `true` if the product was not already wishlisted.
    pub fn add(&mut self, product_id: ProductId) -> bool {
        let added = self.items.insert(product_id);
        if added { self.raise_event(WishlistEvent::Added { product_id }); }
        added
    }

    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let removed = self.items.remove(&product_id);
        if removed { self.raise_event(WishlistEvent::Removed { product_id }); }
        removed
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: WishlistEvent) { self.events.push(DomainEvent::Wishlist(e)); }
}
