//! Session store - the single source of truth for the acting principal.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use shared::Role;
use shared::client::LoginResponse;
use tokio::sync::watch;

use super::storage::{ROLE_KEY, SessionStorage, SessionStorageError, TOKEN_KEY, USER_ID_KEY};
use crate::error::{ClientError, ClientResult};

// ============================================================================
// Principal
// ============================================================================

/// Credentials of an authenticated actor.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Opaque bearer token issued by the backend.
    pub token: String,
    /// Normalised role.
    pub role: Role,
    /// Backend user id.
    pub user_id: i64,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// The actor as known to the client.
///
/// Token, role and user id are either all present or all absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    credentials: Option<Credentials>,
}

impl Principal {
    /// Unauthenticated principal.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated principal.
    pub fn authenticated(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    /// True iff a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.credentials.as_ref().map(|c| c.role)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.credentials.as_ref().map(|c| c.user_id)
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

// ============================================================================
// Session Store
// ============================================================================

type StoredFields = (Option<String>, Option<String>, Option<String>);

/// Token, role and user id as stored, blanks treated as absent
fn read_fields(storage: &dyn SessionStorage) -> Result<StoredFields, SessionStorageError> {
    let non_empty = |key: &str| -> Result<Option<String>, SessionStorageError> {
        Ok(storage.get(key)?.filter(|v| !v.trim().is_empty()))
    };
    Ok((
        non_empty(TOKEN_KEY)?,
        non_empty(ROLE_KEY)?,
        non_empty(USER_ID_KEY)?,
    ))
}

struct SessionInner {
    storage: Box<dyn SessionStorage>,
    state: watch::Sender<Principal>,
    /// Serialises storage write + publish pairs.
    write_lock: Mutex<()>,
}

/// Shared handle to the process-wide session.
///
/// Cloning is cheap; all clones observe the same principal. Every mutation
/// is written through to storage before it is published, and subscribers
/// are notified before the mutating call returns.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage", &self.inner.storage)
            .field("principal", &*self.inner.state.borrow())
            .finish()
    }
}

impl SessionStore {
    /// Builds a store from whatever `storage` holds.
    ///
    /// Incomplete or unparsable fragments are discarded and the storage is
    /// wiped, so the store starts either fully authenticated or empty.
    pub fn restore(storage: impl SessionStorage + 'static) -> ClientResult<Self> {
        let principal = Self::load_principal(&storage)?;
        if principal.is_authenticated() {
            tracing::info!(
                user_id = principal.user_id(),
                role = ?principal.role(),
                "Restored persisted session"
            );
        }
        let (state, _) = watch::channel(principal);
        Ok(Self {
            inner: Arc::new(SessionInner {
                storage: Box::new(storage),
                state,
                write_lock: Mutex::new(()),
            }),
        })
    }

    fn load_principal(storage: &dyn SessionStorage) -> ClientResult<Principal> {
        let principal = match read_fields(storage) {
            // A truncated or corrupt file is treated like any other fragment
            Err(SessionStorageError::Json(e)) => {
                tracing::warn!(error = %e, "Persisted session is unreadable");
                None
            }
            Err(e) => return Err(e.into()),
            Ok((None, None, None)) => return Ok(Principal::anonymous()),
            Ok((Some(token), Some(role), Some(user_id))) => {
                match (role.parse::<Role>(), user_id.trim().parse::<i64>()) {
                    (Ok(role), Ok(user_id)) => Some(Principal::authenticated(Credentials {
                        token,
                        role,
                        user_id,
                    })),
                    _ => None,
                }
            }
            _ => None,
        };

        match principal {
            Some(principal) => Ok(principal),
            None => {
                tracing::warn!("Discarding incomplete persisted session");
                storage.clear()?;
                Ok(Principal::anonymous())
            }
        }
    }

    /// Current principal (a consistent snapshot).
    pub fn read(&self) -> Principal {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Principal> {
        self.inner.state.subscribe()
    }

    /// Replaces the principal and persists it.
    ///
    /// On a storage failure the in-memory principal is left unchanged.
    pub fn set_credentials(
        &self,
        token: impl Into<String>,
        role: Role,
        user_id: i64,
    ) -> ClientResult<()> {
        let token = token.into();
        let _guard = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.inner.storage.set_many(&[
            (TOKEN_KEY, token.clone()),
            (ROLE_KEY, role.as_str().to_string()),
            (USER_ID_KEY, user_id.to_string()),
        ])?;

        self.inner
            .state
            .send_replace(Principal::authenticated(Credentials {
                token,
                role,
                user_id,
            }));
        tracing::debug!(user_id, role = %role, "Session credentials set");
        Ok(())
    }

    /// Stores a login response, normalising its role string.
    pub fn apply_login(&self, response: LoginResponse) -> ClientResult<Role> {
        let role = response
            .role
            .parse::<Role>()
            .map_err(|e| ClientError::Auth(e.to_string()))?;
        self.set_credentials(response.token, role, response.user_id)?;
        Ok(role)
    }

    /// Logs out: resets the principal and wipes the storage.
    ///
    /// The in-memory principal is always cleared, even if the wipe fails.
    pub fn clear(&self) -> ClientResult<()> {
        let _guard = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.inner.state.send_replace(Principal::anonymous());
        self.inner.storage.clear()?;
        tracing::debug!("Session cleared");
        Ok(())
    }
}
