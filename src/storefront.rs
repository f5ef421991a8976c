//! Storefront controller
//!
//! Owns every piece of session state (cart, wishlist, comparison, filters)
//! next to a shared read-only [`Catalog`]. All mutations go through here so
//! that persistence and UI-sync notifications happen in one place: after a
//! mutation the aggregate's events are drained, the aggregate is saved, and
//! the events are broadcast to whoever renders the storefront.

use std::sync::Arc;
use serde::Serialize;
use tokio::sync::broadcast;
use crate::domain::aggregates::{Cart, CartLine, Comparison, Product, Toggle, Wishlist};
use crate::domain::catalog::Catalog;
use crate::domain::events::{DomainEvent, FilterEvent};
use crate::domain::filter::{self, CategoryFilter, FilterState, SortKey};
use crate::domain::value_objects::{Money, ProductId};
use crate::persistence::{Persistence, CART_KEY, WISHLIST_KEY};
use crate::{Result, StoreError};

const NOTIFY_CAPACITY: usize = 64;

/// A user action forwarded by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    AddToCart { product_id: ProductId, quantity: u32 },
    RemoveFromCart { product_id: ProductId },
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    ClearCart,
    AddToWishlist { product_id: ProductId },
    RemoveFromWishlist { product_id: ProductId },
    ToggleComparison { product_id: ProductId },
    SetCategory(CategoryFilter),
    SetSort(SortKey),
    SetSearch(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran; `changed` is false when it was a no-op.
    Applied { changed: bool },
    WishlistAdded(bool),
    Compared(Toggle),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLineView>,
    pub count: u64,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

pub struct Storefront {
    catalog: Arc<Catalog>,
    cart: Cart,
    wishlist: Wishlist,
    comparison: Comparison,
    filter: FilterState,
    persistence: Persistence,
    notifier: broadcast::Sender<DomainEvent>,
}

impl Storefront {
    /// Restores the persisted cart and wishlist, falling back to empty ones.
    pub async fn open(catalog: Arc<Catalog>, persistence: Persistence) -> Self {
        let lines: Vec<CartLine> = persistence.load(CART_KEY, Vec::new()).await;
        let ids: Vec<ProductId> = persistence.load(WISHLIST_KEY, Vec::new()).await;
        let mut cart = Cart::restore(lines);
        let mut wishlist = Wishlist::restore(ids);
        cart.take_events();
        wishlist.take_events();
        tracing::info!(cart_lines = cart.lines().len(), wishlist_items = wishlist.len(), "storefront session restored");

        let (notifier, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            catalog, cart, wishlist, comparison: Comparison::new(), filter: FilterState::default(),
            persistence, notifier,
        }
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    /// UI-sync feed. Every change to session state is published here.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> { self.notifier.subscribe() }

    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        tracing::debug!(?command, "dispatching");
        let outcome = match command {
            Command::AddToCart { product_id, quantity } => {
                self.add_to_cart(product_id, quantity).await?;
                Outcome::Applied { changed: true }
            }
            Command::RemoveFromCart { product_id } => Outcome::Applied { changed: self.remove_from_cart(product_id).await },
            Command::UpdateQuantity { product_id, quantity } => {
                Outcome::Applied { changed: self.update_quantity(product_id, quantity).await? }
            }
            Command::ClearCart => {
                self.clear_cart().await;
                Outcome::Applied { changed: true }
            }
            Command::AddToWishlist { product_id } => Outcome::WishlistAdded(self.add_to_wishlist(product_id).await?),
            Command::RemoveFromWishlist { product_id } => {
                Outcome::Applied { changed: self.remove_from_wishlist(product_id).await }
            }
            Command::ToggleComparison { product_id } => Outcome::Compared(self.toggle_comparison(product_id)?),
            Command::SetCategory(category) => Outcome::Applied { changed: self.set_category(category) },
            Command::SetSort(sort) => Outcome::Applied { changed: self.set_sort(sort) },
            Command::SetSearch(term) => Outcome::Applied { changed: self.set_search(term) },
        };
        Ok(outcome)
    }

    // ---- cart ----

    pub async fn add_to_cart(&mut self, product_id: ProductId, quantity: u32) -> Result<()> {
        if let Err(e) = self.cart.add_item(&self.catalog, product_id, quantity) {
            tracing::warn!(%product_id, quantity, error = %e, "add to cart rejected");
            return Err(e.into());
        }
        self.sync_cart().await;
        Ok(())
    }

    pub async fn remove_from_cart(&mut self, product_id: ProductId) -> bool {
        let removed = self.cart.remove_item(product_id);
        self.sync_cart().await;
        removed
    }

    /// Sets an absolute quantity; zero or negative removes the line.
    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<bool> {
        let changed = match self.cart.update_quantity(product_id, quantity) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!(%product_id, quantity, error = %e, "quantity update rejected");
                return Err(e.into());
            }
        };
        self.sync_cart().await;
        Ok(changed)
    }

    pub async fn clear_cart(&mut self) {
        self.cart.clear();
        self.sync_cart().await;
    }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn cart_total(&self) -> Money { self.cart.total(&self.catalog) }
    pub fn cart_count(&self) -> u64 { self.cart.count() }

    /// Cart lines joined with their products. Lines that no longer resolve are skipped.
    pub fn cart_summary(&self) -> CartSummary {
        let lines = self.cart.lines().iter()
            .filter_map(|line| {
                let product = self.catalog.get(line.product_id)?;
                Some(CartLineView {
                    product_id: line.product_id,
                    name: product.name().to_string(),
                    unit_price: product.price().clone(),
                    quantity: line.quantity,
                    line_total: product.price().multiply(line.quantity),
                })
            })
            .collect();
        CartSummary { lines, count: self.cart_count(), total: self.cart_total() }
    }

    // ---- wishlist ----

    /// Returns whether the product was newly added.
    pub async fn add_to_wishlist(&mut self, product_id: ProductId) -> Result<bool> {
        self.require_product(product_id)?;
        let added = self.wishlist.add(product_id);
        self.sync_wishlist().await;
        Ok(added)
    }

    pub async fn remove_from_wishlist(&mut self, product_id: ProductId) -> bool {
        let removed = self.wishlist.remove(product_id);
        self.sync_wishlist().await;
        removed
    }

    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool { self.wishlist.contains(product_id) }
    pub fn wishlist(&self) -> &Wishlist { &self.wishlist }

    pub fn wishlist_products(&self) -> Vec<&Product> {
        self.wishlist.ids().into_iter().filter_map(|id| self.catalog.get(id)).collect()
    }

    // ---- comparison ----

    pub fn toggle_comparison(&mut self, product_id: ProductId) -> Result<Toggle> {
        self.require_product(product_id)?;
        let toggle = self.comparison.toggle(product_id)?;
        let events = self.comparison.take_events();
        self.publish(events);
        Ok(toggle)
    }

    pub fn comparison(&self) -> &[ProductId] { self.comparison.items() }

    pub fn comparison_products(&self) -> Vec<&Product> {
        self.comparison.items().iter().filter_map(|&id| self.catalog.get(id)).collect()
    }

    // ---- browsing ----

    pub fn filter_state(&self) -> &FilterState { &self.filter }

    pub fn set_category(&mut self, category: CategoryFilter) -> bool {
        self.update_filter(|f| std::mem::replace(&mut f.category, category) != category)
    }

    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        self.update_filter(|f| std::mem::replace(&mut f.sort, sort) != sort)
    }

    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        self.update_filter(|f| {
            if f.search == term { return false; }
            f.search = term;
            true
        })
    }

    /// Catalog products under the session's current filter state.
    pub fn visible_products(&self) -> Vec<&Product> { filter::filter_products(&self.catalog, &self.filter) }

    pub fn suggestions(&self, term: &str) -> Vec<&Product> { filter::suggestions(&self.catalog, term) }

    // ---- internals ----

    fn require_product(&self, product_id: ProductId) -> Result<()> {
        if self.catalog.contains(product_id) { return Ok(()); }
        tracing::warn!(%product_id, "reference to unknown product ignored");
        Err(StoreError::ProductNotFound(product_id))
    }

    fn update_filter(&mut self, apply: impl FnOnce(&mut FilterState) -> bool) -> bool {
        let changed = apply(&mut self.filter);
        if changed { self.publish(vec![DomainEvent::Filter(FilterEvent::Changed)]); }
        changed
    }

    async fn sync_cart(&mut self) {
        let events = self.cart.take_events();
        if events.is_empty() { return; }
        self.persistence.save(CART_KEY, self.cart.lines()).await;
        self.publish(events);
    }

    async fn sync_wishlist(&mut self) {
        let events = self.wishlist.take_events();
        if events.is_empty() { return; }
        self.persistence.save(WISHLIST_KEY, &self.wishlist.ids()).await;
        self.publish(events);
    }

    fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            // No subscribers is fine: nothing is rendering right now.
            let _ = self.notifier.send(event);
        }
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cart", &self.cart.lines())
            .field("wishlist", &self.wishlist.ids())
            .field("comparison", &self.comparison.items())
            .field("filter", &self.filter)
            .finish()
    }
}
