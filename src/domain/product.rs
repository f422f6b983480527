//! Product identifiers and the catalog's answer shape.
//!
//! The catalog owns product data. This service only ever sees the records
//! the catalog chooses to return for a lookup.

use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog-assigned product identifier. Opaque here; the catalog decides
/// the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One product as the catalog reports it: current price and display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub price: Decimal,
    pub name: String,
}
