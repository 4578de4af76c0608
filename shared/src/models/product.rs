//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Pizza,
    Drink,
    Sauce,
}

impl ProductCategory {
    /// Pizzas and drinks are sold in sizes; sauces are not
    pub fn requires_size(&self) -> bool {
        matches!(self, Self::Pizza | Self::Drink)
    }

    /// Sizes a product of this category may be offered in
    pub fn sizes(&self) -> &'static [ProductSize] {
        match self {
            Self::Pizza => &[ProductSize::Small, ProductSize::Medium, ProductSize::Large],
            Self::Drink => &[ProductSize::Ml330, ProductSize::Ml500],
            Self::Sauce => &[],
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pizza => "PIZZA",
            Self::Drink => "DRINK",
            Self::Sauce => "SAUCE",
        };
        f.write_str(name)
    }
}

/// Product size (pizza diameters and drink volumes share one enum on the wire)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProductSize {
    #[serde(rename = "SMALL")]
    Small,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LARGE")]
    Large,
    #[serde(rename = "_330ML")]
    Ml330,
    #[serde(rename = "_500ML")]
    Ml500,
}

impl ProductSize {
    /// Whether this size is valid for the given category
    pub fn fits(&self, category: ProductCategory) -> bool {
        category.sizes().contains(self)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::Ml330 => "330ml",
            Self::Ml500 => "500ml",
        }
    }
}

/// Catalog item as returned by `GET /products`
///
/// Read-only from the client's point of view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price in currency unit
    pub price: Decimal,
    pub category: ProductCategory,
    #[serde(default)]
    pub size: Option<ProductSize>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub is_alcoholic: Option<bool>,
    #[serde(default)]
    pub has_image: Option<bool>,
    /// Stock on hand (never checked client-side)
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// Create product payload (the `request` part of the multipart upload)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    /// Initial stock
    pub total_amount: Decimal,
    pub category: ProductCategory,
    /// Omitted entirely for sauces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ProductSize>,
}
