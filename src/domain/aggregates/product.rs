//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::domain::value_objects::{EcoRating, Money, ProductId};

/// Stock level below which a product is flagged as running low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Immutable catalog record. Built once when the catalog loads.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    category: Category,
    price: Money,
    image: String,
    description: String,
    eco_rating: EcoRating,
    stock: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category { Natural, Recycled, Eco }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "class", content = "text", rename_all = "kebab-case")]
pub enum StockStatus { OutOfStock, LowStock(u32), InStock }

impl Product {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProductId, name: impl Into<String>, category: Category, price: Decimal,
        image: impl Into<String>, description: impl Into<String>, eco_rating: EcoRating, stock: u32,
    ) -> Self {
        Self {
            id, name: name.into(), category, price: Money::usd(price), image: image.into(),
            description: description.into(), eco_rating, stock,
        }
    }

    pub fn id(&self) -> ProductId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn category(&self) -> Category { self.category }
    pub fn price(&self) -> &Money { &self.price }
    pub fn image(&self) -> &str { &self.image }
    pub fn description(&self) -> &str { &self.description }
    pub fn eco_rating(&self) -> EcoRating { self.eco_rating }
    pub fn stock(&self) -> u32 { self.stock }
    pub fn is_in_stock(&self) -> bool { self.stock > 0 }

    pub fn stock_status(&self) -> StockStatus {
        match self.stock {
            0 => StockStatus::OutOfStock,
            n if n < LOW_STOCK_THRESHOLD => StockStatus::LowStock(n),
            _ => StockStatus::InStock,
        }
    }

    /// Case-insensitive substring match against name or description.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Natural, Category::Recycled, Category::Eco];

    pub fn slug(&self) -> &'static str {
        match self { Self::Natural => "natural", Self::Recycled => "recycled", Self::Eco => "eco" }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.slug()) }
}

impl FromStr for Category {
    type Err = UnknownCategory;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.slug() == s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl StockStatus {
    pub fn label(&self) -> String {
        match self {
            Self::OutOfStock => "Out of Stock".to_string(),
            Self::LowStock(n) => format!("{n} left"),
            Self::InStock => "In Stock".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: u32) -> Product {
        Product::new(
            ProductId::new(1).unwrap(), "Bamboo Toothbrush Set", Category::Natural, Decimal::new(1299, 2),
            "", "Biodegradable bamboo toothbrushes", EcoRating::new(5).unwrap(), stock,
        )
    }

    #[test]
    fn test_stock_status() {
        assert_eq!(product(0).stock_status(), StockStatus::OutOfStock);
        assert_eq!(product(9).stock_status().label(), "9 left");
        assert_eq!(product(10).stock_status(), StockStatus::InStock);
        assert!(!product(0).is_in_stock());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("recycled".parse::<Category>().unwrap(), Category::Recycled);
        assert!("all".parse::<Category>().is_err());
        assert_eq!(serde_json::to_string(&Category::Eco).unwrap(), "\"eco\"");
    }

    #[test]
    fn test_search_match_ignores_case() {
        let p = product(5);
        assert!(p.matches_lowercase("bamboo"));
        assert!(p.matches_lowercase("biodegradable"));
        assert!(!p.matches_lowercase("solar"));
    }
}
