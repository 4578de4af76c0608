// pizza-client/src/checkout.rs
// Order creation flow - cart + address + submission

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{CatalogItem, Order, OrderRequest};
use tokio::sync::watch;

use crate::backend::Backend;
use crate::cart::{Cart, format_money};
use crate::catalog::{CatalogState, load_catalog};
use crate::error::{ClientError, ClientResult};
use crate::notify::Notification;
use crate::session::SessionStore;

/// Derived view of the cart, published after every mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Distinct items with a positive quantity
    pub selected_lines: usize,
    pub total: Decimal,
}

impl CartSummary {
    pub fn formatted_total(&self) -> String {
        format_money(self.total)
    }
}

/// Customer order-creation view model
///
/// Owns the cart and delivery address. A successful submission resets both;
/// a failed one leaves them intact so the user can retry.
pub struct Checkout {
    backend: Arc<dyn Backend>,
    session: SessionStore,
    catalog: CatalogState,
    cart: Cart,
    address: String,
    summary: watch::Sender<CartSummary>,
}

impl Checkout {
    pub fn new(backend: Arc<dyn Backend>, session: SessionStore) -> Self {
        let (summary, _) = watch::channel(CartSummary::default());
        Self {
            backend,
            session,
            catalog: CatalogState::Loaded(Vec::new()),
            cart: Cart::new(),
            address: String::new(),
            summary,
        }
    }

    /// Fetch the product list; a failure leaves an empty catalog
    pub async fn refresh_catalog(&mut self) -> &CatalogState {
        self.catalog = load_catalog(self.backend.as_ref()).await;
        self.publish();
        &self.catalog
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn products(&self) -> &[CatalogItem] {
        self.catalog.items()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn increment(&mut self, item_id: i64) -> u32 {
        self.update_quantity(item_id, 1)
    }

    pub fn decrement(&mut self, item_id: i64) -> u32 {
        self.update_quantity(item_id, -1)
    }

    pub fn update_quantity(&mut self, item_id: i64, delta: i32) -> u32 {
        let quantity = self.cart.update_quantity(item_id, delta);
        self.publish();
        quantity
    }

    pub fn summary(&self) -> CartSummary {
        self.summary.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.summary.subscribe()
    }

    fn publish(&self) {
        let summary = CartSummary {
            selected_lines: self.cart.selected_count(),
            total: self.cart.total(self.catalog.items()),
        };
        self.summary.send_replace(summary);
    }

    /// Validate, attach the acting user, and post the order
    ///
    /// Validation runs before any network call. On success the cart and
    /// address are cleared regardless of what the server echoed.
    pub async fn submit(&mut self) -> ClientResult<Order> {
        let items = self.cart.build_submission(&self.address)?;
        let user_id = self
            .session
            .read()
            .user_id()
            .ok_or(ClientError::NotAuthenticated)?;

        let request = OrderRequest {
            address: self.address.clone(),
            items,
            user_id,
        };
        let order = self.backend.create_order(&request).await.map_err(|e| {
            tracing::error!(
                user_id,
                lines = request.items.len(),
                error = %e,
                "Order submission failed"
            );
            e
        })?;

        tracing::info!(order_id = order.id, user_id, "Order placed");
        self.cart.clear();
        self.address.clear();
        self.publish();
        Ok(order)
    }

    /// [`Self::submit`] folded into the notification the user sees
    pub async fn place_order(&mut self) -> Notification {
        match self.submit().await {
            Ok(_) => Notification::order_placed(),
            Err(e) => Notification::order_failed(&e),
        }
    }
}
