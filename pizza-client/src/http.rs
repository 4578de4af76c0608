// pizza-client/src/http.rs
// HTTP client - network communication with the order backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::client::{ApiErrorBody, LoginRequest, LoginResponse, SignUpRequest};
use shared::{
    AssignmentResult, CatalogItem, Order, OrderFilter, OrderRequest, ProcessOrderRequest,
    ProductCreate,
};

use crate::backend::{Backend, ProductPhoto};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// reqwest-based [`Backend`]
///
/// The bearer token is read from the session on every request, so a login
/// or logout takes effect for the next call without rebuilding the client.
#[derive(Debug, Clone)]
pub struct PizzaApi {
    client: Client,
    config: ClientConfig,
    session: SessionStore,
}

impl PizzaApi {
    pub fn new(config: &ClientConfig, session: SessionStore) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
            session,
        })
    }

    /// Session this client authenticates with
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.read().token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.config.endpoint(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.config.endpoint(path)))
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.patch(self.config.endpoint(path)))
    }

    /// Turns a non-2xx response into [`ClientError::Api`]
    async fn check_status(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.message().map(str::to_string));
        tracing::warn!(status = %status, message = ?message, "Backend returned an error");
        Err(ClientError::Api { status, message })
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Backend for PizzaApi {
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        // No bearer header: a stale token must not leak into a fresh login
        let response = self
            .client
            .post(self.config.endpoint("users/login"))
            .json(request)
            .send()
            .await?;

        match Self::handle_response(response).await {
            Err(ClientError::Api { status, message }) if status.is_client_error() => {
                Err(ClientError::Auth(
                    message.unwrap_or_else(|| INVALID_CREDENTIALS.to_string()),
                ))
            }
            other => other,
        }
    }

    async fn sign_up(&self, request: &SignUpRequest) -> ClientResult<()> {
        let response = self
            .client
            .post(self.config.endpoint("users/sign-up"))
            .json(request)
            .send()
            .await?;
        // The created user echo is not needed
        Self::check_status(response).await?;
        Ok(())
    }

    async fn list_products(&self) -> ClientResult<Vec<CatalogItem>> {
        let response = self.get("products").send().await?;
        Self::handle_response(response).await
    }

    async fn create_product(
        &self,
        product: &ProductCreate,
        photo: Option<ProductPhoto>,
    ) -> ClientResult<CatalogItem> {
        let request = Part::text(serde_json::to_string(product)?).mime_str("application/json")?;
        let mut form = Form::new().part("request", request);
        if let Some(photo) = photo {
            let part = Part::bytes(photo.bytes)
                .file_name(photo.file_name)
                .mime_str(&photo.mime)?;
            form = form.part("photo", part);
        }

        let response = self.post("products").multipart(form).send().await?;
        Self::handle_response(response).await
    }

    async fn create_order(&self, request: &OrderRequest) -> ClientResult<Order> {
        let response = self.post("orders").json(request).send().await?;
        Self::handle_response(response).await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>> {
        let response = self.get("orders").query(filter).send().await?;
        Self::handle_response(response).await
    }

    async fn get_order(&self, order_id: i64) -> ClientResult<Order> {
        let response = self.get(&format!("orders/{order_id}")).send().await?;
        match Self::handle_response(response).await {
            Err(ClientError::Api {
                status: StatusCode::NOT_FOUND,
                message,
            }) => Err(ClientError::Api {
                status: StatusCode::NOT_FOUND,
                message: message.or_else(|| Some(format!("Order #{order_id} not found"))),
            }),
            other => other,
        }
    }

    async fn process_order(
        &self,
        order_id: i64,
        request: &ProcessOrderRequest,
    ) -> ClientResult<AssignmentResult> {
        let response = self
            .patch(&format!("orders/{order_id}"))
            .json(request)
            .send()
            .await?;
        Self::handle_response(response).await
    }
}
