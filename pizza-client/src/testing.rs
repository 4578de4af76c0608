// pizza-client/src/testing.rs
// In-process backend fake and fixtures for unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::StatusCode;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::client::{LoginRequest, LoginResponse, SignUpRequest};
use shared::{
    AssignmentResult, CatalogItem, Order, OrderFilter, OrderLine, OrderRequest, OrderStatus,
    ProcessOrderRequest, ProductCategory, ProductCreate, ProductSize,
};
use tokio::sync::Notify;

use crate::backend::{Backend, ProductPhoto};
use crate::error::{ClientError, ClientResult};

pub(crate) fn catalog_item(
    id: i64,
    name: &str,
    price: Decimal,
    category: ProductCategory,
) -> CatalogItem {
    let size = match category {
        ProductCategory::Pizza => Some(ProductSize::Large),
        ProductCategory::Drink => Some(ProductSize::Ml330),
        ProductCategory::Sauce => None,
    };
    CatalogItem {
        id,
        name: name.to_string(),
        description: None,
        price,
        category,
        size,
        status: None,
        active: Some(true),
        is_alcoholic: None,
        has_image: None,
        total_amount: None,
    }
}

pub(crate) fn order(id: i64, status: OrderStatus, user_id: i64) -> Order {
    Order {
        id,
        status,
        user_id: Some(user_id),
        address: format!("Street {id}"),
        created_at: None,
        updated_at: None,
        items: vec![OrderLine {
            order_id: Some(id),
            product_id: 1,
            product_name: "Margherita".into(),
            quantity: 2,
            price_at_order_time: Decimal::new(950, 2),
        }],
    }
}

struct Account {
    password: String,
    response: LoginResponse,
}

#[derive(Default)]
struct FakeState {
    accounts: HashMap<String, Account>,
    products: Vec<CatalogItem>,
    orders: Vec<Order>,
    failures: HashMap<&'static str, (StatusCode, Option<String>)>,
    calls: Vec<(&'static str, serde_json::Value)>,
    assignment: (f64, f64),
}

/// Scriptable [`Backend`] that records every call
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
    /// Operations that wait for a permit before answering
    holds: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                assignment: (12.5, 0.75),
                ..FakeState::default()
            }),
            holds: Mutex::new(HashMap::new()),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub(crate) fn add_account(&self, username: &str, password: &str, role: &str, user_id: i64) {
        self.with_state(|s| {
            s.accounts.insert(
                username.to_string(),
                Account {
                    password: password.to_string(),
                    response: LoginResponse {
                        token: format!("token-{username}"),
                        role: role.to_string(),
                        user_id,
                    },
                },
            )
        });
    }

    pub(crate) fn set_products(&self, products: Vec<CatalogItem>) {
        self.with_state(|s| s.products = products);
    }

    pub(crate) fn set_orders(&self, orders: Vec<Order>) {
        self.with_state(|s| s.orders = orders);
    }

    pub(crate) fn set_assignment(&self, distance: f64, time: f64) {
        self.with_state(|s| s.assignment = (distance, time));
    }

    /// Make every later call of `op` fail with `status` and `message`
    pub(crate) fn fail(&self, op: &'static str, status: StatusCode, message: Option<&str>) {
        self.with_state(|s| {
            s.failures
                .insert(op, (status, message.map(str::to_string)))
        });
    }

    pub(crate) fn recover(&self, op: &'static str) {
        self.with_state(|s| s.failures.remove(op));
    }

    /// Hold every later call of `op` until the returned handle is notified
    ///
    /// The response is computed when the call arrives, so a held call
    /// answers with the state of that moment.
    pub(crate) fn hold(&self, op: &'static str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds.lock().unwrap().insert(op, notify.clone());
        notify
    }

    async fn wait_if_held(&self, op: &str) {
        let hold = self.holds.lock().unwrap().get(op).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
    }

    pub(crate) fn calls(&self, op: &str) -> usize {
        self.with_state(|s| s.calls.iter().filter(|(name, _)| *name == op).count())
    }

    pub(crate) fn last_payload(&self, op: &str) -> Option<serde_json::Value> {
        self.with_state(|s| {
            s.calls
                .iter()
                .rev()
                .find(|(name, _)| *name == op)
                .map(|(_, payload)| payload.clone())
        })
    }

    /// Record the call and return the scripted failure, if any
    fn enter(&self, op: &'static str, payload: impl Serialize) -> ClientResult<()> {
        let payload = serde_json::to_value(payload)?;
        self.with_state(|s| {
            s.calls.push((op, payload));
            match s.failures.get(op) {
                Some((status, message)) => Err(ClientError::Api {
                    status: *status,
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        })
    }
}

fn not_found(what: &str) -> ClientError {
    ClientError::Api {
        status: StatusCode::NOT_FOUND,
        message: Some(format!("{what} not found")),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.enter("login", &request.username)?;
        self.with_state(|s| match s.accounts.get(&request.username) {
            Some(account) if account.password == request.password => {
                Ok(account.response.clone())
            }
            _ => Err(ClientError::Auth("Bad credentials".into())),
        })
    }

    async fn sign_up(&self, request: &SignUpRequest) -> ClientResult<()> {
        self.enter("sign_up", request)
    }

    async fn list_products(&self) -> ClientResult<Vec<CatalogItem>> {
        self.enter("list_products", ())?;
        Ok(self.with_state(|s| s.products.clone()))
    }

    async fn create_product(
        &self,
        product: &ProductCreate,
        photo: Option<ProductPhoto>,
    ) -> ClientResult<CatalogItem> {
        self.enter(
            "create_product",
            serde_json::json!({
                "request": product,
                "photo": photo.as_ref().map(|p| &p.file_name),
            }),
        )?;
        Ok(self.with_state(|s| {
            let item = CatalogItem {
                id: s.products.len() as i64 + 1,
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                category: product.category,
                size: product.size,
                status: None,
                active: Some(true),
                is_alcoholic: None,
                has_image: Some(photo.is_some()),
                total_amount: Some(product.total_amount),
            };
            s.products.push(item.clone());
            item
        }))
    }

    async fn create_order(&self, request: &OrderRequest) -> ClientResult<Order> {
        self.enter("create_order", request)?;
        Ok(self.with_state(|s| {
            let id = s.orders.iter().map(|o| o.id).max().unwrap_or(0) + 1;
            let items = request
                .items
                .iter()
                .map(|line| {
                    let product = s.products.iter().find(|p| p.id == line.product_id);
                    OrderLine {
                        order_id: Some(id),
                        product_id: line.product_id,
                        product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
                        quantity: line.quantity,
                        price_at_order_time: product.map(|p| p.price).unwrap_or_default(),
                    }
                })
                .collect();
            let order = Order {
                id,
                status: OrderStatus::New,
                user_id: Some(request.user_id),
                address: request.address.clone(),
                created_at: None,
                updated_at: None,
                items,
            };
            s.orders.push(order.clone());
            order
        }))
    }

    async fn list_orders(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>> {
        self.enter("list_orders", filter)?;
        let orders: Vec<Order> = self.with_state(|s| {
            s.orders
                .iter()
                .filter(|o| filter.status.is_none_or(|status| o.status == status))
                .filter(|o| filter.user_id.is_none_or(|id| o.user_id == Some(id)))
                .cloned()
                .collect()
        });
        self.wait_if_held("list_orders").await;
        Ok(orders)
    }

    async fn get_order(&self, order_id: i64) -> ClientResult<Order> {
        self.enter("get_order", order_id)?;
        self.with_state(|s| {
            s.orders
                .iter()
                .find(|o| o.id == order_id)
                .cloned()
                .ok_or_else(|| not_found(&format!("Order #{order_id}")))
        })
    }

    async fn process_order(
        &self,
        order_id: i64,
        request: &ProcessOrderRequest,
    ) -> ClientResult<AssignmentResult> {
        let entered = self.enter(
            "process_order",
            serde_json::json!({"orderId": order_id, "employeeId": request.employee_id}),
        );

        self.wait_if_held("process_order").await;
        entered?;

        self.with_state(|s| {
            let (distance, time) = s.assignment;
            let order = s
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| not_found(&format!("Order #{order_id}")))?;
            order.status = OrderStatus::Processing;
            Ok(AssignmentResult {
                order: order.clone(),
                distance,
                time,
            })
        })
    }
}
