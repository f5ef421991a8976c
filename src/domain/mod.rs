//! Storefront domain: catalog, aggregates, filtering and events
pub mod value_objects;
pub mod aggregates;
pub mod events;
pub mod catalog;
pub mod filter;
