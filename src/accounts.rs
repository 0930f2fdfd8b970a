//! Registration, login and logout.
//!
//! Usernames are compared exactly (no trimming, no case folding). Input
//! validation belongs to the caller; see `validation.rs`.

use crate::store::{Store, StoreError};
use crate::user::User;

impl Store {
    /// Register a new user with an empty activity list.
    /// Returns `false` without changing anything if the username is taken.
    pub fn register(&mut self, username: &str, password: &str) -> Result<bool, StoreError> {
        if self.find_user(username).is_some() {
            tracing::info!(username, "registration rejected: username taken");
            return Ok(false);
        }

        self.users.push(User::new(username, password));
        if let Err(e) = self.save_users() {
            self.users.pop();
            return Err(e);
        }
        tracing::info!(username, "registered user");
        Ok(true)
    }

    /// Start a session if a user matches both username and password.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool, StoreError> {
        if !self
            .users
            .iter()
            .any(|u| u.credentials_match(username, password))
        {
            tracing::info!(username, "login failed");
            return Ok(false);
        }

        let previous = self.current_user.replace(username.to_string());
        if let Err(e) = self.save_session() {
            self.current_user = previous;
            return Err(e);
        }
        tracing::info!(username, "logged in");
        Ok(true)
    }

    /// End the current session, if any
    pub fn logout(&mut self) -> Result<(), StoreError> {
        let previous = self.current_user.take();
        if let Err(e) = self.save_session() {
            self.current_user = previous;
            return Err(e);
        }
        if let Some(name) = previous {
            tracing::info!(username = %name, "logged out");
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }
}
