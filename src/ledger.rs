//! Per-user activity lists.
//!
//! Activities are free text kept in insertion order. Duplicates are allowed
//! and removal is by value: every entry equal to the given text goes.

use crate::store::{Store, StoreError};

impl Store {
    /// Activities of `username`, empty if the user does not exist
    pub fn list_activities(&self, username: &str) -> &[String] {
        self.find_user(username)
            .map(|u| u.activities.as_slice())
            .unwrap_or_default()
    }

    /// Append `text` verbatim. Returns `false` if the user does not exist.
    pub fn add_activity(&mut self, username: &str, text: &str) -> Result<bool, StoreError> {
        let Some(user) = self.find_user_mut(username) else {
            tracing::debug!(username, "add_activity: unknown user");
            return Ok(false);
        };

        user.activities.push(text.to_string());
        if let Err(e) = self.save_users() {
            if let Some(user) = self.find_user_mut(username) {
                user.activities.pop();
            }
            return Err(e);
        }
        tracing::debug!(username, "activity added");
        Ok(true)
    }

    /// Remove every activity equal to `text`. Returns how many were removed.
    pub fn remove_activity(&mut self, username: &str, text: &str) -> Result<usize, StoreError> {
        let Some(user) = self.find_user_mut(username) else {
            tracing::debug!(username, "remove_activity: unknown user");
            return Ok(0);
        };

        let previous = user.activities.clone();
        user.activities.retain(|a| a != text);
        let removed = previous.len() - user.activities.len();

        if removed > 0 {
            if let Err(e) = self.save_users() {
                if let Some(user) = self.find_user_mut(username) {
                    user.activities = previous;
                }
                return Err(e);
            }
            tracing::debug!(username, removed, "activities removed");
        }
        Ok(removed)
    }

    pub fn current_activities(&self) -> Result<&[String], StoreError> {
        let name = self.current_user().ok_or(StoreError::NotAuthenticated)?;
        Ok(self.list_activities(name))
    }

    pub fn add_current_activity(&mut self, text: &str) -> Result<bool, StoreError> {
        let name = self
            .current_user
            .clone()
            .ok_or(StoreError::NotAuthenticated)?;
        self.add_activity(&name, text)
    }

    pub fn remove_current_activity(&mut self, text: &str) -> Result<usize, StoreError> {
        let name = self
            .current_user
            .clone()
            .ok_or(StoreError::NotAuthenticated)?;
        self.remove_activity(&name, text)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::KeyValueStore;
    use crate::store::tests::{failing_store, memory_store};
    use crate::store::{Store, StoreError, USERS_KEY};

    fn store_with_alice() -> Store {
        let mut store = memory_store();
        store.register("alice", "pw1").unwrap();
        store
    }

    #[test]
    fn test_insertion_order_and_duplicates() {
        let mut store = store_with_alice();
        store.add_activity("alice", "Run").unwrap();
        store.add_activity("alice", "Read").unwrap();
        store.add_activity("alice", "Run").unwrap();
        assert_eq!(store.list_activities("alice"), ["Run", "Read", "Run"]);
    }

    #[test]
    fn test_text_is_stored_verbatim() {
        let mut store = store_with_alice();
        store.add_activity("alice", "  Walk the dog ").unwrap();
        assert_eq!(store.list_activities("alice"), ["  Walk the dog "]);
    }

    #[test]
    fn test_remove_all_occurrences() {
        let mut store = store_with_alice();
        for a in ["a1", "a1", "a2"] {
            store.add_activity("alice", a).unwrap();
        }

        assert_eq!(store.remove_activity("alice", "a1").unwrap(), 2);
        assert_eq!(store.list_activities("alice"), ["a2"]);
    }

    #[test]
    fn test_remove_missing_activity_is_noop() {
        let mut store = store_with_alice();
        store.add_activity("alice", "Run").unwrap();

        assert_eq!(store.remove_activity("alice", "run").unwrap(), 0);
        assert_eq!(store.list_activities("alice"), ["Run"]);
    }

    #[test]
    fn test_unknown_user_is_noop() {
        let mut store = store_with_alice();
        assert!(store.list_activities("bob").is_empty());
        assert!(!store.add_activity("bob", "Run").unwrap());
        assert_eq!(store.remove_activity("bob", "Run").unwrap(), 0);
        assert!(store.list_activities("bob").is_empty());
        assert_eq!(store.users().len(), 1);
    }

    #[test]
    fn test_activities_are_per_user() {
        let mut store = store_with_alice();
        store.register("bob", "pw").unwrap();
        store.add_activity("alice", "Run").unwrap();
        store.add_activity("bob", "Swim").unwrap();

        store.remove_activity("bob", "Run").unwrap();
        assert_eq!(store.list_activities("alice"), ["Run"]);
        assert_eq!(store.list_activities("bob"), ["Swim"]);
    }

    #[test]
    fn test_mutations_rewrite_users_key() {
        let mut store = store_with_alice();
        store.add_activity("alice", "Run").unwrap();

        let backend = store.into_backend();
        let raw = backend.get(USERS_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"username": "alice", "password": "pw1", "activities": ["Run"]}])
        );
    }

    #[test]
    fn test_failed_writes_roll_back() {
        let (mut store, fail) = failing_store();
        store.register("alice", "pw1").unwrap();
        for a in ["Run", "Read", "Run"] {
            store.add_activity("alice", a).unwrap();
        }

        fail.set(true);
        assert!(store.add_activity("alice", "Swim").is_err());
        assert!(store.remove_activity("alice", "Run").is_err());
        assert_eq!(store.list_activities("alice"), ["Run", "Read", "Run"]);

        fail.set(false);
        assert_eq!(store.remove_activity("alice", "Run").unwrap(), 2);
        assert_eq!(store.list_activities("alice"), ["Read"]);
    }

    #[test]
    fn test_current_user_helpers_require_session() {
        let mut store = store_with_alice();
        assert!(matches!(
            store.add_current_activity("Run"),
            Err(StoreError::NotAuthenticated)
        ));
        assert!(matches!(
            store.remove_current_activity("Run"),
            Err(StoreError::NotAuthenticated)
        ));
        assert!(matches!(
            store.current_activities(),
            Err(StoreError::NotAuthenticated)
        ));

        store.login("alice", "pw1").unwrap();
        assert!(store.add_current_activity("Run").unwrap());
        assert_eq!(store.current_activities().unwrap(), ["Run"]);
        assert_eq!(store.remove_current_activity("Run").unwrap(), 1);
        assert!(store.current_activities().unwrap().is_empty());
    }

    #[test]
    fn test_alice_scenario() {
        let mut store = memory_store();
        assert!(store.register("alice", "pw1").unwrap());
        assert!(!store.register("alice", "pw2").unwrap());
        assert!(store.login("alice", "pw1").unwrap());

        store.add_activity("alice", "Run").unwrap();
        assert_eq!(store.list_activities("alice"), ["Run"]);

        store.remove_activity("alice", "Run").unwrap();
        assert!(store.list_activities("alice").is_empty());
    }
}
