//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Catalog product identifier. Always a positive integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ProductId(u32);

impl ProductId {
    pub fn new(value: u32) -> Result<Self, ProductIdError> {
        if value == 0 { return Err(ProductIdError::NotPositive); }
        Ok(Self(value))
    }

    /// Parses an identifier coming from outside the engines (path segments, form fields).
    pub fn parse(raw: &str) -> Result<Self, ProductIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() { return Err(ProductIdError::Empty); }
        let value: u32 = trimmed.parse().map_err(|_| ProductIdError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }

    pub fn value(&self) -> u32 { self.0 }
}

impl FromStr for ProductId {
    type Err = ProductIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl TryFrom<u32> for ProductId {
    type Error = ProductIdError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<ProductId> for u32 {
    fn from(id: ProductId) -> Self { id.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductIdError {
    #[error("product id is empty")]
    Empty,
    #[error("product id `{0}` is not an integer")]
    NotANumber(String),
    #[error("product id must be positive")]
    NotPositive,
}

/// Shop price in US dollars.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money { amount: Decimal }

impl Money {
    pub fn usd(amount: Decimal) -> Self { Self { amount } }
    pub fn zero() -> Self { Self::default() }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn add(&self, other: &Money) -> Money { Money::usd(self.amount + other.amount) }
    pub fn multiply(&self, qty: u32) -> Money { Money::usd(self.amount * Decimal::from(qty)) }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::zero(), |acc, m| acc.add(&m)) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "${:.2}", self.amount.round_dp(2)) }
}

/// Sustainability score shown on every product card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EcoRating(u8);

impl EcoRating {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, EcoRatingError> {
        if !(1..=Self::MAX).contains(&value) { return Err(EcoRatingError::OutOfRange(value)); }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 { self.0 }

    pub fn stars(&self) -> String { stars(self.0) }
}

impl TryFrom<u8> for EcoRating {
    type Error = EcoRatingError;
    fn try_from(value: u8) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<EcoRating> for u8 {
    fn from(rating: EcoRating) -> Self { rating.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcoRatingError {
    #[error("eco rating {0} is outside 1..=5")]
    OutOfRange(u8),
}

/// Renders a 0..=5 score as filled and hollow stars.
pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(EcoRating::MAX));
    let hollow = usize::from(EcoRating::MAX) - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(hollow))
}
