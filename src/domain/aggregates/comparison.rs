//! Comparison Aggregate

use crate::domain::events::{ComparisonEvent, DomainEvent};
use crate::domain::value_objects::ProductId;

pub const MAX_COMPARED: usize = 3;

/// Products picked for side-by-side display, in the order they were picked.
#[derive(Clone, Debug, Default)]
pub struct Comparison {
    items: Vec<ProductId>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle { Added, Removed }

impl Comparison {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[ProductId] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn is_full(&self) -> bool { self.items.len() >= MAX_COMPARED }
    pub fn contains(&self, product_id: ProductId) -> bool { self.items.contains(&product_id) }

    pub fn toggle(&mut self, product_id: ProductId) -> Result<Toggle, ComparisonError> {
        if let Some(index) = self.items.iter().position(|&p| p == product_id) {
            self.items.remove(index);
            self.raise_event(ComparisonEvent::Removed { product_id });
            return Ok(Toggle::Removed);
        }
        if self.is_full() { return Err(ComparisonError::CapacityExceeded); }
        self.items.push(product_id);
        self.raise_event(ComparisonEvent::Added { product_id });
        Ok(Toggle::Added)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: ComparisonEvent) { self.events.push(DomainEvent::Comparison(e)); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("you can only compare up to {MAX_COMPARED} products at a time")]
    CapacityExceeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> ProductId { ProductId::new(n).unwrap() }

    #[test]
    fn test_toggle_preserves_insertion_order() {
        let mut cmp = Comparison::new();
        for n in [3, 1, 2] { assert_eq!(cmp.toggle(id(n)), Ok(Toggle::Added)); }
        assert_eq!(cmp.items(), &[id(3), id(1), id(2)]);
        assert_eq!(cmp.toggle(id(1)), Ok(Toggle::Removed));
        assert_eq!(cmp.items(), &[id(3), id(2)]);
    }

    #[test]
    fn test_fourth_item_is_rejected() {
        let mut cmp = Comparison::new();
        for n in 1..=3 { cmp.toggle(id(n)).unwrap(); }
        cmp.take_events();
        assert_eq!(cmp.toggle(id(4)), Err(ComparisonError::CapacityExceeded));
        assert_eq!(cmp.items(), &[id(1), id(2), id(3)]);
        assert!(cmp.take_events().is_empty());
        // Removing from a full set still works.
        assert_eq!(cmp.toggle(id(2)), Ok(Toggle::Removed));
    }
}
