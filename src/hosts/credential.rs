// ABOUTME: Host credential record: address, login and password of one roster entry
// ABOUTME: Serializes to the {"ip", "username", "password"} objects of the roster file

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCredential {
    #[serde(rename = "ip")]
    pub address: String,
    pub username: String,
    pub password: String,
}

impl HostCredential {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// All three fields must be non-empty. Only checked when a host is added.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.is_empty() {
            return Err(ValidationError::EmptyField("address"));
        }
        if self.username.is_empty() {
            return Err(ValidationError::EmptyField("username"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::EmptyField("password"));
        }
        Ok(())
    }
}

// Keep the password out of debug output and therefore out of logs
impl fmt::Debug for HostCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCredential")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for HostCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.address)
    }
}
