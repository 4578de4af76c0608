// pizza-client/src/orders/detail.rs
// Order detail - one order, newest request wins

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use shared::Order;

use crate::backend::Backend;
use crate::error::ClientResult;

pub const DETAIL_FAILED: &str = "Failed to load order details.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading,
    Loaded(Order),
    Failed(String),
}

impl DetailState {
    pub fn order(&self) -> Option<&Order> {
        match self {
            Self::Loaded(order) => Some(order),
            _ => None,
        }
    }

    /// Σ priceAtOrderTime × quantity of the loaded order
    pub fn total(&self) -> Option<Decimal> {
        self.order().map(Order::total)
    }
}

#[derive(Debug, Default)]
struct DetailInner {
    ticket: u64,
    selected: Option<i64>,
    state: DetailState,
}

/// Detail view model
///
/// Each selection takes a new ticket; a response is applied only if its
/// ticket is still the latest, so a slow answer for a previous order can
/// never overwrite the current one.
pub struct OrderDetail {
    backend: Arc<dyn Backend>,
    inner: Mutex<DetailInner>,
}

impl OrderDetail {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(DetailInner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, DetailInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start showing `order_id`; returns the ticket its response must carry
    pub fn select(&self, order_id: i64) -> u64 {
        let mut inner = self.inner();
        inner.ticket += 1;
        inner.selected = Some(order_id);
        inner.state = DetailState::Loading;
        inner.ticket
    }

    /// Leave the detail view; any outstanding response is dropped
    pub fn deselect(&self) {
        let mut inner = self.inner();
        inner.ticket += 1;
        inner.selected = None;
        inner.state = DetailState::Idle;
    }

    /// Apply a response; returns false if it was stale
    pub fn apply(&self, ticket: u64, result: ClientResult<Order>) -> bool {
        let mut inner = self.inner();
        if ticket != inner.ticket {
            tracing::debug!(ticket, current = inner.ticket, "Discarding stale order detail");
            return false;
        }
        inner.state = match result {
            Ok(order) => DetailState::Loaded(order),
            Err(e) => {
                tracing::error!(order_id = ?inner.selected, error = %e, "Failed to load order");
                DetailState::Failed(DETAIL_FAILED.to_string())
            }
        };
        true
    }

    /// `GET /orders/{id}`
    pub async fn fetch(backend: &dyn Backend, order_id: i64) -> ClientResult<Order> {
        backend.get_order(order_id).await
    }

    /// Select, fetch and apply in one go
    pub async fn load(&self, order_id: i64) -> DetailState {
        let ticket = self.select(order_id);
        let result = Self::fetch(self.backend.as_ref(), order_id).await;
        self.apply(ticket, result);
        self.state()
    }

    pub fn selected(&self) -> Option<i64> {
        self.inner().selected
    }

    pub fn state(&self) -> DetailState {
        self.inner().state.clone()
    }
}
