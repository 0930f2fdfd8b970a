//! The user/session store.
//!
//! `Store` holds the registered users and the current session in memory and
//! mirrors them into a [`KeyValueStore`] under two keys:
//! - `users`: JSON array of every user, rewritten in full on each change
//! - `currentUser`: the logged-in username, absent when logged out
//!
//! Account operations live in `accounts.rs`, activity operations in
//! `ledger.rs`.

use crate::storage::{KeyValueStore, StorageError};
use crate::user::User;
use thiserror::Error;

pub const USERS_KEY: &str = "users";
pub const CURRENT_USER_KEY: &str = "currentUser";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no user is logged in")]
    NotAuthenticated,
}

pub struct Store {
    backend: Box<dyn KeyValueStore>,
    pub(crate) users: Vec<User>,
    pub(crate) current_user: Option<String>,
}

impl Store {
    /// Load users and session from `backend`.
    ///
    /// A missing or unparseable `users` value yields an empty user set. A
    /// session naming an unknown user is dropped and its key removed.
    pub fn open(backend: Box<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let users = load_users(backend.as_ref());
        let mut store = Self {
            backend,
            users,
            current_user: None,
        };

        match store.backend.get(CURRENT_USER_KEY) {
            Some(name) if store.find_user(&name).is_some() => {
                tracing::debug!(username = %name, "restored session");
                store.current_user = Some(name);
            }
            Some(name) => {
                if !name.is_empty() {
                    tracing::warn!(username = %name, "discarding session for unknown user");
                }
                store.backend.remove(CURRENT_USER_KEY)?;
            }
            None => {}
        }

        tracing::debug!(users = store.users.len(), "store opened");
        Ok(store)
    }

    /// Give back the backing store, e.g. to reopen it
    #[cfg(test)]
    pub fn into_backend(self) -> Box<dyn KeyValueStore> {
        self.backend
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub(crate) fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub(crate) fn find_user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.username == username)
    }

    pub(crate) fn save_users(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.users).map_err(|source| StorageError::Encode {
            what: USERS_KEY.to_string(),
            source,
        })?;
        self.backend.set(USERS_KEY, json)?;
        Ok(())
    }

    pub(crate) fn save_session(&mut self) -> Result<(), StoreError> {
        match &self.current_user {
            Some(name) => self.backend.set(CURRENT_USER_KEY, name.clone())?,
            None => self.backend.remove(CURRENT_USER_KEY)?,
        }
        Ok(())
    }
}

fn load_users(backend: &dyn KeyValueStore) -> Vec<User> {
    let Some(raw) = backend.get(USERS_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable '{}' value", USERS_KEY);
            Vec::new()
        }
    }
}
