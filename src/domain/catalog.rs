//! Catalog Store
//!
//! Static, read-only product data. Loaded once at startup and shared by
//! reference with every engine; nothing mutates it afterwards.

use std::collections::HashSet;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::{Category, Product};
use crate::domain::filter::CategoryFilter;
use crate::domain::value_objects::{stars, EcoRating, ProductId};

const ECOSHOP_SEED: &str = include_str!("../../data/catalog.json");

#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<CategoryInfo>,
    testimonials: Vec<Testimonial>,
}

/// Display metadata for a category filter button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: CategoryFilter,
    pub name: String,
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    pub review: String,
    pub rating: u8,
    pub product: String,
}

impl Testimonial {
    pub fn stars(&self) -> String { stars(self.rating) }
}

#[derive(Deserialize)]
struct CatalogSeed {
    products: Vec<ProductRecord>,
    #[serde(default)]
    categories: Vec<CategoryInfo>,
    #[serde(default)]
    testimonials: Vec<Testimonial>,
}

#[derive(Deserialize)]
struct ProductRecord {
    id: u32,
    name: String,
    category: Category,
    price: Decimal,
    #[serde(default)]
    image: String,
    description: String,
    eco_rating: u8,
    stock: u32,
}

impl TryFrom<ProductRecord> for Product {
    type Error = CatalogError;

    fn try_from(r: ProductRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: String| CatalogError::InvalidProduct { id: r.id, reason };
        let id = ProductId::new(r.id).map_err(|e| invalid(e.to_string()))?;
        let eco_rating = EcoRating::new(r.eco_rating).map_err(|e| invalid(e.to_string()))?;
        if r.price.is_sign_negative() { return Err(invalid(format!("negative price {}", r.price))); }
        Ok(Product::new(id, r.name, r.category, r.price, r.image, r.description, eco_rating, r.stock))
    }
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids.
    pub fn new(products: Vec<Product>, categories: Vec<CategoryInfo>, testimonials: Vec<Testimonial>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        if let Some(dup) = products.iter().find(|p| !seen.insert(p.id())) {
            return Err(CatalogError::DuplicateId(dup.id()));
        }
        Ok(Self { products, categories, testimonials })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let seed: CatalogSeed = serde_json::from_str(raw)?;
        let products = seed.products.into_iter().map(Product::try_from).collect::<Result<Vec<_>, _>>()?;
        Self::new(products, seed.categories, seed.testimonials)
    }

    /// The bundled EcoShop catalog.
    pub fn ecoshop() -> Result<Self, CatalogError> { Self::from_json(ECOSHOP_SEED) }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn categories(&self) -> &[CategoryInfo] { &self.categories }
    pub fn testimonials(&self) -> &[Testimonial] { &self.testimonials }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn get(&self, id: ProductId) -> Option<&Product> { self.products.iter().find(|p| p.id() == id) }
    pub fn contains(&self, id: ProductId) -> bool { self.get(id).is_some() }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("product {id} is invalid: {reason}")]
    InvalidProduct { id: u32, reason: String },
    #[error("product id {0} appears more than once")]
    DuplicateId(ProductId),
}
