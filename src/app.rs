// ABOUTME: Core application surface: add, remove, list and reboot hosts
// ABOUTME: Front ends call these operations and only render what they return

use crate::batch::{BatchReport, BatchRebootOrchestrator};
use crate::config::Config;
use crate::error::StoreError;
use crate::hosts::{CredentialStore, HostCredential, HostSelector, LoadStatus};
use crate::ssh::{RebootCommand, RemoteSession};

pub struct App<S: RemoteSession> {
    store: CredentialStore,
    orchestrator: BatchRebootOrchestrator<S>,
}

impl<S: RemoteSession> App<S> {
    /// Load the roster named by the config. The load status is handed back so
    /// the caller can tell a first run from a damaged file.
    pub fn open(config: &Config, session: S) -> (Self, LoadStatus) {
        let (store, status) = CredentialStore::open(config.store_path());
        let command = RebootCommand::new(config.reboot.command.clone());
        let app = Self {
            store,
            orchestrator: BatchRebootOrchestrator::new(session, command),
        };
        (app, status)
    }

    pub fn add_host(&mut self, address: &str, username: &str, password: &str) -> Result<(), StoreError> {
        self.store.add(address, username, password)
    }

    pub fn remove_hosts(&mut self, selectors: &[HostSelector]) -> Result<Vec<HostCredential>, StoreError> {
        self.store.remove(selectors)
    }

    pub fn list_hosts(&self) -> &[HostCredential] {
        self.store.list()
    }

    /// `None` reboots the whole roster.
    pub fn reboot(&self, subset: Option<&[HostSelector]>) -> BatchReport {
        self.orchestrator.reboot_all(&self.store, subset)
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    #[cfg(test)]
    pub fn session(&self) -> &S {
        self.orchestrator.session()
    }
}
