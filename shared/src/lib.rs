//! Shared types for the pizza ordering system
//!
//! Wire DTOs and domain types exchanged between the order backend
//! and `pizza-client`.

pub mod client;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    AssignmentResult, CatalogItem, Order, OrderFilter, OrderLine, OrderLineRequest, OrderRequest,
    OrderStatus, ProcessOrderRequest, ProductCategory, ProductCreate, ProductSize, Role,
};
