// pizza-client/src/orders/history.rs
// Order history - orders placed by the current user

use std::sync::Arc;

use shared::{Order, OrderFilter};

use crate::backend::Backend;
use crate::error::ClientError;
use crate::session::SessionStore;

pub const HISTORY_FAILED: &str = "Failed to fetch order history.";

/// Read-only list of the current user's orders
///
/// Failures surface as an inline error, not a notification.
pub struct OrderHistory {
    backend: Arc<dyn Backend>,
    session: SessionStore,
    orders: Vec<Order>,
    error: Option<String>,
}

impl OrderHistory {
    pub fn new(backend: Arc<dyn Backend>, session: SessionStore) -> Self {
        Self {
            backend,
            session,
            orders: Vec::new(),
            error: None,
        }
    }

    /// `GET /orders?userId=<current user>`
    pub async fn load(&mut self) -> &[Order] {
        let result = match self.session.read().user_id() {
            Some(user_id) => self.backend.list_orders(&OrderFilter::for_user(user_id)).await,
            None => Err(ClientError::NotAuthenticated),
        };

        match result {
            Ok(orders) => {
                tracing::debug!(count = orders.len(), "Order history loaded");
                self.orders = orders;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch order history");
                self.orders.clear();
                self.error = Some(HISTORY_FAILED.to_string());
            }
        }
        &self.orders
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
