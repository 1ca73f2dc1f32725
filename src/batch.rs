// ABOUTME: Batch reboot orchestration over the host roster, one sequential session per host
// ABOUTME: Per-host failures are captured in the report and never stop the remaining hosts

use crate::error::SessionError;
use crate::hosts::selector::{self, HostSelector};
use crate::hosts::{CredentialStore, HostCredential};
use crate::ssh::{ExitStatus, RebootCommand, RemoteSession};
use tracing::{info, warn};

#[derive(Debug)]
pub struct HostOutcome {
    pub host: HostCredential,
    pub result: Result<ExitStatus, SessionError>,
}

impl HostOutcome {
    /// Session completed and the command exited with status 0.
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(status) if status.success())
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<HostOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

pub struct BatchRebootOrchestrator<S: RemoteSession> {
    session: S,
    command: RebootCommand,
}

impl<S: RemoteSession> BatchRebootOrchestrator<S> {
    pub fn new(session: S, command: RebootCommand) -> Self {
        Self { session, command }
    }

    #[cfg(test)]
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Reboot the store's hosts in roster order. `None` means every host;
    /// otherwise only entries matched by one of the selectors.
    pub fn reboot_all(
        &self,
        store: &CredentialStore,
        subset: Option<&[HostSelector]>,
    ) -> BatchReport {
        let roster = store.list();

        match subset {
            None => self.reboot_hosts(roster),
            Some(selectors) => {
                let selection = selector::resolve(roster, selectors);
                for unmatched in &selection.unmatched {
                    warn!(selector = %unmatched, "Selector matched no host, skipping");
                }
                let hosts: Vec<HostCredential> = selection
                    .positions
                    .iter()
                    .map(|&position| roster[position].clone())
                    .collect();
                self.reboot_hosts(&hosts)
            }
        }
    }

    pub fn reboot_hosts(&self, hosts: &[HostCredential]) -> BatchReport {
        info!(
            hosts = hosts.len(),
            command = %self.command.redacted(),
            password_in_command = self.command.uses_password(),
            "Starting batch reboot"
        );

        let outcomes: Vec<HostOutcome> = hosts
            .iter()
            .map(|host| HostOutcome {
                host: host.clone(),
                result: self.reboot_one(host),
            })
            .collect();

        let report = BatchReport { outcomes };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch reboot finished"
        );
        report
    }

    fn reboot_one(&self, host: &HostCredential) -> Result<ExitStatus, SessionError> {
        info!(host = %host, "Rebooting host");
        let command = self.command.render(&host.password);
        let result = self
            .session
            .execute(&host.address, &host.username, &host.password, &command);

        match &result {
            Ok(status) if status.success() => info!(host = %host, "Reboot command accepted"),
            Ok(status) => warn!(host = %host, code = status.code(), "Reboot command exited non-zero"),
            Err(e) => warn!(host = %host, error = %e, "Reboot failed"),
        }
        result
    }
}
