use serde::{Deserialize, Serialize};

/// A registered account and its activity list.
///
/// The password is stored and compared as plaintext; nothing in this crate
/// hashes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl User {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            activities: Vec::new(),
        }
    }

    pub fn credentials_match(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}
