//! EcoShop Storefront Engine
//!
//! Session-side state for a small eco-friendly shop.
//!
//! ## Features
//! - Static product catalog with categories and testimonials
//! - Category / search / sort browsing
//! - Shopping cart and wishlist with local persistence
//! - Side-by-side comparison of up to three products
//! - Debounced search-as-you-type

pub mod api;
pub mod config;
pub mod debounce;
pub mod domain;
pub mod persistence;
pub mod storefront;

use thiserror::Error;

pub use domain::aggregates::{Cart, CartLine, Category, Comparison, Product, Toggle, Wishlist};
pub use domain::catalog::Catalog;
pub use domain::filter::{CategoryFilter, FilterState, SortKey};
pub use domain::value_objects::{EcoRating, Money, ProductId};
pub use persistence::{KeyValueStore, MemoryStore, Persistence, SqliteStore};
pub use storefront::{Command, Outcome, Storefront};

use domain::aggregates::{CartError, ComparisonError, MAX_COMPARED};
use domain::filter::FilterError;
use domain::value_objects::ProductIdError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("You can only compare up to {} products at a time", MAX_COMPARED)]
    ComparisonFull,

    #[error("Invalid product id: {0}")]
    InvalidProductId(#[from] ProductIdError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),
}

impl From<CartError> for StoreError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ProductNotFound(id) => Self::ProductNotFound(id),
            CartError::InvalidQuantity => Self::InvalidQuantity,
        }
    }
}

impl From<ComparisonError> for StoreError {
    fn from(e: ComparisonError) -> Self {
        match e { ComparisonError::CapacityExceeded => Self::ComparisonFull }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
