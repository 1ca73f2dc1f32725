// ABOUTME: Host roster module: credential records, selectors and the persistent store
// ABOUTME: The store is the single source of truth for which machines can be rebooted

pub mod credential;
pub mod selector;
pub mod store;

pub use credential::HostCredential;
pub use selector::HostSelector;
pub use store::{CredentialStore, LoadStatus};
