//! Aggregates module
pub mod product;
pub mod cart;
pub mod wishlist;
pub mod comparison;

pub use product::{Category, Product, StockStatus, UnknownCategory};
pub use cart::{Cart, CartError, CartLine};
pub use wishlist::Wishlist;
pub use comparison::{Comparison, ComparisonError, Toggle, MAX_COMPARED};
