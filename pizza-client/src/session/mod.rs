//! Session module - who is acting now.
//!
//! [`SessionStore`] holds the authenticated [`Principal`] and writes it
//! through to a [`SessionStorage`] backend so it survives restarts.

mod storage;
mod store;

pub use storage::{
    FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStorageError, ROLE_KEY,
    TOKEN_KEY, USER_ID_KEY,
};
pub use store::{Credentials, Principal, SessionStore};
