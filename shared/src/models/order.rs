//! Order Model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Order status
///
/// `NEW → PROCESSING → {COMPLETED, CANCELLED}`. All transitions are made by
/// the backend; the client only observes them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Completed and cancelled orders never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the backend may move an order from `self` to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Cancelled)
        )
    }

    /// Only new orders can be picked up by an employee
    pub fn is_assignable(&self) -> bool {
        self.can_transition_to(Self::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line item (price frozen at order time)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub order_id: Option<i64>,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price in currency unit, as charged when the order was placed
    pub price_at_order_time: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.price_at_order_time * Decimal::from(self.quantity)
    }
}

/// Order entity (server-owned snapshot)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Sum of frozen line prices; never recomputed from the catalog
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderLine::line_total).sum()
    }
}

// =============================================================================
// Request DTOs
// =============================================================================

/// One submitted order line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: u32,
}

/// Create order payload (`POST /orders`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub address: String,
    pub items: Vec<OrderLineRequest>,
    pub user_id: i64,
}

/// Query filter for `GET /orders` (all fields optional, applied server-side)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl OrderFilter {
    /// Orders still waiting for an employee
    pub fn pending() -> Self {
        Self {
            status: Some(OrderStatus::New),
            user_id: None,
        }
    }

    /// Orders placed by one user
    pub fn for_user(user_id: i64) -> Self {
        Self {
            status: None,
            user_id: Some(user_id),
        }
    }
}

/// Assign/process payload (`PATCH /orders/{id}`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOrderRequest {
    pub employee_id: i64,
}

// =============================================================================
// Processing result
// =============================================================================

/// Result of assigning an order to an employee
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentResult {
    pub order: Order,
    /// Delivery distance in kilometers
    #[serde(deserialize_with = "deserialize_measure")]
    pub distance: f64,
    /// Estimated delivery time in hours
    #[serde(deserialize_with = "deserialize_measure")]
    pub time: f64,
}

impl AssignmentResult {
    pub fn distance_label(&self) -> String {
        format!("{:.2} km", self.distance)
    }

    pub fn time_label(&self) -> String {
        format!("{:.2} h", self.time)
    }
}

/// The backend has sent these as both JSON numbers and numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn deserialize_measure<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom)?,
    };
    if !value.is_finite() || value < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative finite number, got {value}"
        )));
    }
    Ok(value)
}
