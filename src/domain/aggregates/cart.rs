//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::catalog::Catalog;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Money, ProductId};

/// A single (product, quantity) line. Quantity is never zero while stored in a [`Cart`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    updated_at: Option<DateTime<Utc>>,
    events: Vec<DomainEvent>,
}

impl CartLine {
    pub fn new(product_id: ProductId, quantity: u32) -> Self { Self { product_id, quantity } }

    /// Price of the line, or `None` when the product no longer resolves.
    pub fn line_total(&self, catalog: &Catalog) -> Option<Money> {
        catalog.get(self.product_id).map(|p| p.price().multiply(self.quantity))
    }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    /// Rebuilds a cart from persisted lines, merging duplicates and dropping empty lines.
    pub fn restore(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            match cart.line_mut(line.product_id) {
                Some(existing) => match existing.quantity.checked_add(line.quantity) {
                    Some(merged) => existing.quantity = merged,
                    None => tracing::warn!(product_id = %line.product_id, "dropping persisted cart line that overflows quantity"),
                },
                None => cart.lines.push(line),
            }
        }
        let restored = cart.lines.len();
        cart.raise_event(CartEvent::Restored { lines: restored });
        cart
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines.iter().find(|l| l.product_id == product_id).map(|l| l.quantity)
    }

    /// Adds `quantity` units, merging into an existing line for the same product.
    pub fn add_item(&mut self, catalog: &Catalog, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 { return Err(CartError::InvalidQuantity); }
        if !catalog.contains(product_id) { return Err(CartError::ProductNotFound(product_id)); }
        match self.line_mut(product_id) {
            Some(existing) => existing.quantity = existing.quantity.checked_add(quantity).ok_or(CartError::InvalidQuantity)?,
            None => self.lines.push(CartLine::new(product_id, quantity)),
        }
        self.touch();
        self.raise_event(CartEvent::ItemAdded { product_id, quantity });
        Ok(())
    }

    /// Removes the line for `product_id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        let removed = self.lines.len() != before;
        if removed {
            self.touch();
            self.raise_event(CartEvent::ItemRemoved { product_id });
        }
        removed
    }

    /// Sets an absolute quantity; zero or negative removes the line.
    /// Returns whether the cart changed. A product without a line is left alone.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<bool, CartError> {
        if self.quantity_of(product_id).is_none() { return Ok(false); }
        if quantity <= 0 { return Ok(self.remove_item(product_id)); }
        let quantity = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity)?;
        if let Some(line) = self.line_mut(product_id) { line.quantity = quantity; }
        self.touch();
        self.raise_event(CartEvent::QuantityUpdated { product_id, quantity });
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
        self.raise_event(CartEvent::Cleared);
    }

    /// Sum of resolvable line totals. Lines whose product is gone contribute nothing.
    pub fn total(&self, catalog: &Catalog) -> Money {
        self.lines.iter().filter_map(|l| l.line_total(catalog)).sum()
    }

    pub fn count(&self) -> u64 { self.lines.iter().map(|l| u64::from(l.quantity)).sum() }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
    fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("product {0} is not in the catalog")]
    ProductNotFound(ProductId),
    #[error("quantity must be between 1 and {}", u32::MAX)]
    InvalidQuantity,
}
