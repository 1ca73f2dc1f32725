// ABOUTME: Credential store that owns the ordered host roster and mirrors it to a JSON file
// ABOUTME: Every mutation rewrites the whole file; a file that exists but cannot be read is never overwritten

use crate::error::{PersistenceError, StoreError};
use crate::hosts::selector::{self, HostSelector};
use crate::hosts::HostCredential;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of reading the roster file at startup.
#[derive(Debug)]
pub enum LoadStatus {
    /// File parsed; holds the number of entries
    Loaded(usize),
    /// No file yet, the usual first run
    Missing,
    /// File exists but is not a valid roster; the roster starts empty
    Corrupt(PersistenceError),
    /// File exists but could not be read (permissions, I/O error). The roster
    /// starts empty and the store refuses to write until a later load succeeds.
    Unreadable(PersistenceError),
}

#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    hosts: Vec<HostCredential>,
    unreadable: bool,
}

impl CredentialStore {
    /// Empty store bound to `path`. Nothing is read or written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hosts: Vec::new(),
            unreadable: false,
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> (Self, LoadStatus) {
        let mut store = Self::new(path);
        let status = store.load();
        (store, status)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory roster with the file's content. A missing or
    /// malformed file leaves the roster empty. A file that exists but cannot be
    /// read also leaves it empty and blocks writes until a later load succeeds.
    pub fn load(&mut self) -> LoadStatus {
        self.unreadable = false;
        match read_roster(&self.path) {
            Ok(Some(hosts)) => {
                info!(path = %self.path.display(), hosts = hosts.len(), "Loaded host roster");
                let count = hosts.len();
                self.hosts = hosts;
                LoadStatus::Loaded(count)
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "No roster file yet, starting empty");
                self.hosts.clear();
                LoadStatus::Missing
            }
            Err(e @ PersistenceError::Parse { .. }) => {
                warn!(error = %e, "Ignoring malformed roster file, starting empty");
                self.hosts.clear();
                LoadStatus::Corrupt(e)
            }
            Err(e) => {
                warn!(error = %e, "Roster file is unreadable, writes are disabled");
                self.hosts.clear();
                self.unreadable = true;
                LoadStatus::Unreadable(e)
            }
        }
    }

    /// Write the full roster, replacing the file. The data goes to a temporary
    /// sibling first and is renamed over the target.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        self.ensure_writable()?;
        let json = serde_json::to_vec_pretty(&self.hosts).map_err(PersistenceError::Serialize)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |source: io::Error| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), hosts = self.len(), "Persisted host roster");
        Ok(())
    }

    /// Append a host and persist. Duplicates are allowed.
    pub fn add(
        &mut self,
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(), StoreError> {
        let host = HostCredential::new(address, username, password);
        host.validate()?;
        self.ensure_writable()?;

        info!(host = %host, "Adding host");
        self.hosts.push(host);
        self.persist()?;
        Ok(())
    }

    /// Remove every entry matched by any selector and persist. Returns the
    /// removed entries in roster order.
    pub fn remove(&mut self, selectors: &[HostSelector]) -> Result<Vec<HostCredential>, StoreError> {
        self.ensure_writable()?;
        let selection = selector::resolve(&self.hosts, selectors);

        if selection.is_empty() {
            let wanted = selectors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(StoreError::NotFound(if wanted.is_empty() {
                "an empty selection".to_string()
            } else {
                wanted
            }));
        }

        for unmatched in &selection.unmatched {
            warn!(selector = %unmatched, "Selector matched no host");
        }

        let mut removed = Vec::with_capacity(selection.positions.len());
        let mut kept = Vec::with_capacity(self.hosts.len() - selection.positions.len());
        for (position, host) in self.hosts.drain(..).enumerate() {
            if selection.positions.binary_search(&position).is_ok() {
                removed.push(host);
            } else {
                kept.push(host);
            }
        }
        self.hosts = kept;

        for host in &removed {
            info!(host = %host, "Removed host");
        }
        self.persist()?;
        Ok(removed)
    }

    fn ensure_writable(&self) -> Result<(), PersistenceError> {
        if self.unreadable {
            return Err(PersistenceError::Unreadable {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    pub fn list(&self) -> &[HostCredential] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// `Ok(None)` when the file does not exist.
fn read_roster(path: &Path) -> Result<Option<Vec<HostCredential>>, PersistenceError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| PersistenceError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
