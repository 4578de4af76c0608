//! Pizza Client - storefront/admin client for the pizza order backend
//!
//! Provides the session store, route authorization, cart aggregation and
//! order lifecycle view models on top of an HTTP client for the backend API.

pub mod auth;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod notify;
pub mod orders;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthFlow, SignUpForm};
pub use backend::{Backend, ProductPhoto};
pub use cart::{Cart, format_money};
pub use catalog::{CatalogState, ProductDraft};
pub use checkout::{CartSummary, Checkout};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ProcessingError, ValidationError};
pub use gate::{Decision, Gate, Route};
pub use http::PizzaApi;
pub use notify::{Notification, NotificationLevel};
pub use orders::{AssignmentOutcome, DetailState, OrderDetail, OrderHistory, ProcessQueue};
pub use session::{Credentials, Principal, SessionStore};

// Re-export shared types for convenience
pub use shared::{CatalogItem, Order, OrderStatus, Role};
