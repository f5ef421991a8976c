//! Filter/Sort Engine
//!
//! Pure functions from a [`Catalog`] and a [`FilterState`] to an ordered
//! product listing. Nothing here mutates the catalog.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::{Category, Product};
use crate::domain::catalog::Catalog;

/// How many products the search box suggests at most.
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "price-low")]
    PriceAscending,
    #[serde(rename = "price-high")]
    PriceDescending,
    #[serde(rename = "eco-rating")]
    EcoRatingDescending,
    /// Stock level stands in for popularity.
    #[serde(rename = "popularity")]
    StockDescending,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub search: String,
    pub sort: SortKey,
}

impl CategoryFilter {
    pub fn admits(&self, category: Category) -> bool {
        match self { Self::All => true, Self::Only(c) => *c == category }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::All => f.write_str("all"), Self::Only(c) => write!(f, "{c}") }
    }
}

impl FromStr for CategoryFilter {
    type Err = FilterError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "" => Ok(Self::All),
            other => other.parse().map(Self::Only).map_err(|_| FilterError::UnknownCategory(other.to_string())),
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = FilterError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self { filter.to_string() }
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Name, SortKey::PriceAscending, SortKey::PriceDescending,
        SortKey::EcoRatingDescending, SortKey::StockDescending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceAscending => "price-low",
            Self::PriceDescending => "price-high",
            Self::EcoRatingDescending => "eco-rating",
            Self::StockDescending => "popularity",
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => compare_names(a.name(), b.name()),
            Self::PriceAscending => a.price().amount().cmp(&b.price().amount()),
            Self::PriceDescending => b.price().amount().cmp(&a.price().amount()),
            Self::EcoRatingDescending => b.eco_rating().cmp(&a.eco_rating()),
            Self::StockDescending => b.stock().cmp(&a.stock()),
        }
    }
}

impl FromStr for SortKey {
    type Err = FilterError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|k| k.as_str() == s.trim()).ok_or_else(|| FilterError::UnknownSortKey(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("unknown sort key `{0}`")]
    UnknownSortKey(String),
}

// Case-folded first so "bamboo" and "Bamboo" sit together, raw text breaks the tie.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Applies category, search and sort to the catalog. Ties keep catalog order.
///
/// The search term is matched exactly as typed, surrounding whitespace included.
pub fn filter_products<'a>(catalog: &'a Catalog, state: &FilterState) -> Vec<&'a Product> {
    let needle = state.search.to_lowercase();
    let mut products: Vec<&Product> = catalog.products().iter()
        .filter(|p| state.category.admits(p.category()))
        .filter(|p| needle.is_empty() || p.matches_lowercase(&needle))
        .collect();
    products.sort_by(|a, b| state.sort.compare(a, b));
    products
}

/// Quick matches for the search box, in catalog order. Blank terms suggest nothing.
pub fn suggestions<'a>(catalog: &'a Catalog, term: &str) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() { return vec![]; }
    catalog.products().iter().filter(|p| p.matches_lowercase(&needle)).take(MAX_SUGGESTIONS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn ids(products: &[&Product]) -> Vec<u32> { products.iter().map(|p| p.id().value()).collect() }

    fn state(category: CategoryFilter, search: &str, sort: SortKey) -> FilterState {
        FilterState { category, search: search.to_string(), sort }
    }

    #[test]
    fn test_natural_category_for_every_sort_key() {
        let catalog = Catalog::ecoshop().unwrap();
        for sort in SortKey::ALL {
            let mut found = ids(&filter_products(&catalog, &state(CategoryFilter::Only(Category::Natural), "", sort)));
            found.sort_unstable();
            assert_eq!(found, vec![1, 4], "sort key {sort:?}");
        }
    }

    #[test]
    fn test_price_ascending() {
        let catalog = Catalog::ecoshop().unwrap();
        let prices: Vec<Decimal> = filter_products(&catalog, &state(CategoryFilter::All, "", SortKey::PriceAscending))
            .iter().map(|p| p.price().amount()).collect();
        let expected: Vec<Decimal> = [850, 1299, 1599, 2499, 4599, 29999].into_iter().map(|c| Decimal::new(c, 2)).collect();
        assert_eq!(prices, expected);
    }

    #[test]
    fn test_other_sort_keys() {
        let catalog = Catalog::ecoshop().unwrap();
        let all = |sort| ids(&filter_products(&catalog, &state(CategoryFilter::All, "", sort)));
        assert_eq!(all(SortKey::Name), vec![1, 6, 4, 2, 3, 5]);
        assert_eq!(all(SortKey::PriceDescending), vec![5, 3, 6, 4, 1, 2]);
        // Ties stay in catalog order: 1, 3, 5 rate 5 and 2, 4, 6 rate 4.
        assert_eq!(all(SortKey::EcoRatingDescending), vec![1, 3, 5, 2, 4, 6]);
        assert_eq!(all(SortKey::StockDescending), vec![4, 6, 1, 2, 3, 5]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let catalog = Catalog::ecoshop().unwrap();
        assert_eq!(ids(&filter_products(&catalog, &state(CategoryFilter::All, "SOLAR", SortKey::Name))), vec![3]);
        assert_eq!(ids(&filter_products(&catalog, &state(CategoryFilter::All, "reclaimed", SortKey::Name))), vec![5]);
        assert_eq!(ids(&filter_products(&catalog, &state(CategoryFilter::Only(Category::Eco), "recycled", SortKey::Name))), Vec::<u32>::new());
    }

    #[test]
    fn test_search_term_is_not_trimmed() {
        let catalog = Catalog::ecoshop().unwrap();
        let search = |term| ids(&filter_products(&catalog, &state(CategoryFilter::All, term, SortKey::Name)));
        assert!(search("charger ").is_empty());
        assert_eq!(search(" charger"), vec![3]); // "phone charger"
        assert_eq!(search(" ").len(), catalog.len());
    }

    #[test]
    fn test_filtering_leaves_catalog_untouched() {
        let catalog = Catalog::ecoshop().unwrap();
        let before = ids(&catalog.products().iter().collect::<Vec<_>>());
        filter_products(&catalog, &state(CategoryFilter::All, "", SortKey::PriceDescending));
        assert_eq!(ids(&catalog.products().iter().collect::<Vec<_>>()), before);
    }

    #[test]
    fn test_suggestions() {
        let catalog = Catalog::ecoshop().unwrap();
        assert!(suggestions(&catalog, "   ").is_empty());
        assert_eq!(ids(&suggestions(&catalog, "e")).len(), MAX_SUGGESTIONS);
        assert_eq!(ids(&suggestions(&catalog, "bulbs")), vec![6]);
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!("eco".parse::<CategoryFilter>(), Ok(CategoryFilter::Only(Category::Eco)));
        assert!("plastic".parse::<CategoryFilter>().is_err());
        assert_eq!("price-high".parse::<SortKey>(), Ok(SortKey::PriceDescending));
        assert!("cheapest".parse::<SortKey>().is_err());
        assert_eq!(serde_json::to_string(&CategoryFilter::Only(Category::Recycled)).unwrap(), "\"recycled\"");
    }
}
