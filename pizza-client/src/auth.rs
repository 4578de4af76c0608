// pizza-client/src/auth.rs
// Auth flow - login, sign-up and logout on top of the session store

use std::sync::Arc;

use shared::Role;
use shared::client::{LoginRequest, SignUpRequest};

use crate::backend::Backend;
use crate::error::{ClientResult, ValidationError};
use crate::gate::{Route, landing_route};
use crate::notify::Notification;
use crate::session::SessionStore;

/// Sign-up form contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Default for SignUpForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            role: Role::Customer,
        }
    }
}

impl SignUpForm {
    /// Required fields present and the email looks like one
    pub fn validate(&self) -> Result<SignUpRequest, ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("Username"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("Email"));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("Password"));
        }

        Ok(SignUpRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            user_role: self.role,
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Login / sign-up / logout
pub struct AuthFlow {
    backend: Arc<dyn Backend>,
    session: SessionStore,
}

impl AuthFlow {
    pub fn new(backend: Arc<dyn Backend>, session: SessionStore) -> Self {
        Self { backend, session }
    }

    /// Authenticate and store the session; returns the landing route
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Route> {
        if username.trim().is_empty() {
            return Err(ValidationError::MissingField("Username").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("Password").into());
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.backend.login(&request).await.map_err(|e| {
            tracing::warn!(username = %username, error = %e, "Login failed");
            e
        })?;

        let role = self.session.apply_login(response)?;
        tracing::info!(username = %username, role = %role, "Logged in");
        Ok(landing_route(role))
    }

    /// [`Self::login`] with a failure turned into the notification to show
    pub async fn login_with_notice(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Route, Notification> {
        self.login(username, password)
            .await
            .map_err(|e| Notification::login_failed(&e))
    }

    /// Register a new account; the user is sent to the login page afterwards
    pub async fn sign_up(&self, form: &SignUpForm) -> ClientResult<Route> {
        let request = form.validate()?;
        self.backend.sign_up(&request).await?;
        tracing::info!(
            username = %request.username,
            role = %request.user_role,
            "Account registered"
        );
        Ok(Route::Login)
    }

    /// [`Self::sign_up`] folded into the notification the user sees
    pub async fn sign_up_with_notice(&self, form: &SignUpForm) -> (Notification, Option<Route>) {
        match self.sign_up(form).await {
            Ok(route) => (Notification::signed_up(), Some(route)),
            Err(e) => (Notification::sign_up_failed(&e), None),
        }
    }

    /// Drop the session; returns the login route
    pub fn logout(&self) -> ClientResult<Route> {
        self.session.clear()?;
        tracing::info!("Logged out");
        Ok(Route::Login)
    }
}
