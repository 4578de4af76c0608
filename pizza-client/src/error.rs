//! Client error types

use http::StatusCode;
use shared::{ProductCategory, ProductSize};
use thiserror::Error;

use crate::session::SessionStorageError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the backend's `{message}` when parseable
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },

    /// Invalid credentials, or a missing/expired token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An actor-attributed action was attempted without a session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Rejected locally before any request was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Order assignment failed
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Persisted session could not be read or written
    #[error("Session storage error: {0}")]
    Storage(#[from] SessionStorageError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// The message the backend sent with this error, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            Self::Auth(message) => Some(message.as_str()),
            Self::Processing(ProcessingError::Backend { source, .. }) => source.server_message(),
            _ => None,
        }
    }

    /// Text suitable for a user-facing notification
    ///
    /// Local errors (validation, duplicate clicks) carry their own wording;
    /// everything else shows the server message or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Processing(err @ ProcessingError::AlreadyInFlight(_))
            | Self::Processing(err @ ProcessingError::NotAssignable { .. }) => err.to_string(),
            Self::NotAuthenticated => "Please log in first.".to_string(),
            _ => self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// True for 401 responses and local auth failures
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Auth(_) | Self::NotAuthenticated => true,
            Self::Api { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }
}

/// Local validation failures, raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide a delivery address.")]
    EmptyAddress,

    #[error("Your cart is empty!")]
    EmptyCart,

    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("{0} must not be negative.")]
    Negative(&'static str),

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Size is required for {0}.")]
    SizeRequired(ProductCategory),

    #[error("Size {} is not offered for {category}.", .size.label())]
    SizeMismatch {
        category: ProductCategory,
        size: ProductSize,
    },
}

/// Failures of the employee "process order" action
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// A call for this order is still outstanding
    #[error("Order #{0} is already being processed.")]
    AlreadyInFlight(i64),

    /// The local snapshot says the order has left `NEW`
    #[error("Order #{order_id} is {status} and cannot be assigned.")]
    NotAssignable {
        order_id: i64,
        status: shared::OrderStatus,
    },

    /// The backend call failed
    #[error("Error calculating the coordinates of order #{order_id}")]
    Backend {
        order_id: i64,
        #[source]
        source: Box<ClientError>,
    },
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
