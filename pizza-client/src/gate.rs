//! Authorization Gate
//!
//! Route table and the single place where role logic lives.
//!
//! ## Rules
//! - Not authenticated: redirect to login
//! - Authenticated but role not in the route's set: redirect to unauthorized
//! - Public routes (login, sign-up) always allow

use std::fmt;

use shared::Role;

use crate::session::{Principal, SessionStore};

const EMPLOYEE_ONLY: &[Role] = &[Role::Employee];
const CUSTOMER_ONLY: &[Role] = &[Role::Customer];
const ANY_ROLE: &[Role] = &[Role::Customer, Role::Employee];

/// Navigation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    SignUp,
    /// Shown when an authenticated user lacks the required role
    Unauthorized,
    CreateProduct,
    ProcessOrders,
    CreateOrder,
    OrderDetail(i64),
    OrderHistory,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::SignUp => "/sign-up".into(),
            Self::Unauthorized => "/unauthorized".into(),
            Self::CreateProduct => "/products/new".into(),
            Self::ProcessOrders => "/orders/process".into(),
            Self::CreateOrder => "/orders/new".into(),
            Self::OrderDetail(id) => format!("/orders/{id}"),
            Self::OrderHistory => "/orders".into(),
        }
    }

    /// Resolve a path; fixed segments win over `/orders/{id}`
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim().trim_end_matches('/');
        match path {
            "/login" => Some(Self::Login),
            "/sign-up" => Some(Self::SignUp),
            "/unauthorized" => Some(Self::Unauthorized),
            "/products/new" => Some(Self::CreateProduct),
            "/orders/process" => Some(Self::ProcessOrders),
            "/orders/new" => Some(Self::CreateOrder),
            "/orders" => Some(Self::OrderHistory),
            _ => path
                .strip_prefix("/orders/")
                .and_then(|id| id.parse::<i64>().ok())
                .map(Self::OrderDetail),
        }
    }

    /// Roles allowed to enter; `None` for public routes
    pub fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Self::Login | Self::SignUp | Self::Unauthorized => None,
            Self::CreateProduct | Self::ProcessOrders => Some(EMPLOYEE_ONLY),
            Self::CreateOrder => Some(CUSTOMER_ONLY),
            Self::OrderDetail(_) | Self::OrderHistory => Some(ANY_ROLE),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a navigation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToUnauthorized,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Where to go instead, if anywhere
    pub fn redirect_target(&self) -> Option<Route> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(Route::Login),
            Self::RedirectToUnauthorized => Some(Route::Unauthorized),
        }
    }
}

/// Core rule for a protected target
///
/// An empty `required_roles` means "any authenticated user".
pub fn can_enter(required_roles: &[Role], principal: &Principal) -> Decision {
    let Some(role) = principal.role().filter(|_| principal.is_authenticated()) else {
        return Decision::RedirectToLogin;
    };
    if !required_roles.is_empty() && !required_roles.contains(&role) {
        return Decision::RedirectToUnauthorized;
    }
    Decision::Allow
}

/// Decision for a route
pub fn authorize(route: &Route, principal: &Principal) -> Decision {
    match route.required_roles() {
        None => Decision::Allow,
        Some(roles) => can_enter(roles, principal),
    }
}

/// Where a freshly logged-in user goes
pub fn landing_route(role: Role) -> Route {
    match role {
        Role::Employee => Route::ProcessOrders,
        Role::Customer => Route::OrderHistory,
    }
}

/// Navigation entries shown to `principal`, in display order
pub fn menu(principal: &Principal) -> Vec<Route> {
    if !principal.is_authenticated() {
        return vec![Route::Login, Route::SignUp];
    }
    [
        Route::OrderHistory,
        Route::ProcessOrders,
        Route::CreateProduct,
        Route::CreateOrder,
    ]
    .into_iter()
    .filter(|route| authorize(route, principal).is_allowed())
    .collect()
}

/// Gate bound to the process session
#[derive(Debug, Clone)]
pub struct Gate {
    session: SessionStore,
}

impl Gate {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Evaluate `route` against one snapshot of the session
    pub fn check(&self, route: &Route) -> Decision {
        let principal = self.session.read();
        let decision = authorize(route, &principal);
        tracing::debug!(
            route = %route,
            role = ?principal.role(),
            decision = ?decision,
            "Navigation checked"
        );
        decision
    }

    /// Menu for the current session
    pub fn menu(&self) -> Vec<Route> {
        menu(&self.session.read())
    }
}
