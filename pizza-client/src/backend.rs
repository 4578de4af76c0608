// pizza-client/src/backend.rs
// Backend seam - every remote operation the flows depend on

use async_trait::async_trait;
use shared::client::{LoginRequest, LoginResponse, SignUpRequest};
use shared::{
    AssignmentResult, CatalogItem, Order, OrderFilter, OrderRequest, ProcessOrderRequest,
    ProductCreate,
};

use crate::error::ClientResult;

/// Image attached to a new product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPhoto {
    pub file_name: String,
    /// MIME type, e.g. `image/png`
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Order backend operations
///
/// Implemented over HTTP by [`crate::PizzaApi`]. The flows hold it as
/// `Arc<dyn Backend>` so they can run against an in-process fake.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /users/login`
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse>;

    /// `POST /users/sign-up`
    async fn sign_up(&self, request: &SignUpRequest) -> ClientResult<()>;

    /// `GET /products`
    async fn list_products(&self) -> ClientResult<Vec<CatalogItem>>;

    /// `POST /products` (multipart)
    async fn create_product(
        &self,
        product: &ProductCreate,
        photo: Option<ProductPhoto>,
    ) -> ClientResult<CatalogItem>;

    /// `POST /orders`
    async fn create_order(&self, request: &OrderRequest) -> ClientResult<Order>;

    /// `GET /orders?status=&userId=`
    async fn list_orders(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>>;

    /// `GET /orders/{id}`
    async fn get_order(&self, order_id: i64) -> ClientResult<Order>;

    /// `PATCH /orders/{id}`
    async fn process_order(
        &self,
        order_id: i64,
        request: &ProcessOrderRequest,
    ) -> ClientResult<AssignmentResult>;
}
