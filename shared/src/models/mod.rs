//! Data models
//!
//! Shared between the order backend and the client (via API).
//! All IDs are `i64` (backend `Long`). Wire names are camelCase.

pub mod order;
pub mod product;
pub mod role;

// Re-exports
pub use order::*;
pub use product::*;
pub use role::*;
