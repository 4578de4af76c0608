//! User-visible notifications
//!
//! Every mutating flow ends in one of these: a success toast, or an error
//! carrying the server message (or a generic fallback).

use std::fmt;

use crate::error::ClientError;

pub const ORDER_PLACED: &str = "Order placed successfully!";
pub const ORDER_FAILED_PREFIX: &str = "Order failed: ";
pub const SERVER_ERROR: &str = "Server error";
pub const PRODUCT_CREATED: &str = "Product created successfully!";
pub const PRODUCT_FAILED: &str = "Failed to create product.";
pub const SIGN_UP_SUCCESS: &str = "Registration successful! Please login.";
pub const SIGN_UP_FAILED: &str = "Registration failed. Please check your details.";
pub const LOGIN_FAILED: &str = "Invalid username or password";
pub const PROCESSING_FAILED: &str = "Error calculating the coordinates of the order";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            text: text.into(),
        }
    }

    /// Error notification for `err`, also emitted as a trace record
    ///
    /// Validation failures are logged at `warn`, everything else at `error`.
    pub fn from_error(prefix: &str, fallback: &str, err: &ClientError) -> Self {
        match err {
            ClientError::Validation(_) => {
                tracing::warn!(error = %err, "Rejected before submission")
            }
            _ => tracing::error!(error = %err, "Request failed"),
        }
        Self::error(format!("{prefix}{}", err.user_message(fallback)))
    }

    pub fn order_placed() -> Self {
        Self::success(ORDER_PLACED)
    }

    /// "Order failed: ..." for a submission error
    pub fn order_failed(err: &ClientError) -> Self {
        match err {
            // Local checks show their own text without the prefix
            ClientError::Validation(_) => Self::from_error("", SERVER_ERROR, err),
            _ => Self::from_error(ORDER_FAILED_PREFIX, SERVER_ERROR, err),
        }
    }

    pub fn order_processing(order_id: i64) -> Self {
        Self::success(format!("Order #{order_id} is now being processed!"))
    }

    pub fn processing_failed(err: &ClientError) -> Self {
        Self::from_error("", PROCESSING_FAILED, err)
    }

    pub fn login_failed(err: &ClientError) -> Self {
        Self::from_error("", LOGIN_FAILED, err)
    }

    pub fn signed_up() -> Self {
        Self::success(SIGN_UP_SUCCESS)
    }

    pub fn sign_up_failed(err: &ClientError) -> Self {
        Self::from_error("", SIGN_UP_FAILED, err)
    }

    pub fn product_created() -> Self {
        Self::success(PRODUCT_CREATED)
    }

    pub fn product_failed(err: &ClientError) -> Self {
        Self::from_error("", PRODUCT_FAILED, err)
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
