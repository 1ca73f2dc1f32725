// ABOUTME: Remote session abstraction and its ssh2-backed implementation
// ABOUTME: One password-authenticated connection per call, running exactly one command

use crate::error::SessionError;
use ssh2::Session;
use std::fmt;
use std::io::Read;
use std::net::TcpStream;
use std::ops::{Deref, DerefMut};
use tracing::debug;

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Exit status reported by the remote command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitStatus(i32);

impl ExitStatus {
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn success(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit status {}", self.0)
    }
}

/// Runs one command on one host and waits for it to finish.
pub trait RemoteSession {
    fn execute(
        &self,
        address: &str,
        username: &str,
        password: &str,
        command: &str,
    ) -> Result<ExitStatus, SessionError>;
}

/// ssh2 executor. The remote host key is accepted without verification and
/// no timeout is set, so an unresponsive host blocks the call.
#[derive(Clone, Debug)]
pub struct SshSession {
    port: u16,
}

impl SshSession {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for SshSession {
    fn default() -> Self {
        Self::new(DEFAULT_SSH_PORT)
    }
}

impl RemoteSession for SshSession {
    fn execute(
        &self,
        address: &str,
        username: &str,
        password: &str,
        command: &str,
    ) -> Result<ExitStatus, SessionError> {
        debug!(address, port = self.port(), "Opening SSH connection");
        let tcp = TcpStream::connect((address, self.port()))
            .map_err(|e| SessionError::connect(address, e))?;

        let mut session = Session::new().map_err(|e| SessionError::connect(address, e))?;
        session.set_tcp_stream(tcp);
        let mut session = ClosingSession::new(session);

        session
            .handshake()
            .map_err(|e| SessionError::connect(address, e))?;

        debug!(address, username, "Authenticating with password");
        session
            .userauth_password(username, password)
            .map_err(|e| SessionError::auth(address, username, e))?;
        if !session.authenticated() {
            return Err(SessionError::auth(
                address,
                username,
                "server did not accept the password",
            ));
        }

        let mut channel = session
            .channel_session()
            .map_err(|e| SessionError::command(address, e))?;
        channel
            .exec(command)
            .map_err(|e| SessionError::command(address, e))?;

        // Drain output so the remote side can finish and report its status
        let mut output = Vec::new();
        channel
            .read_to_end(&mut output)
            .map_err(|e| SessionError::command(address, e))?;
        let mut errors = Vec::new();
        channel
            .stderr()
            .read_to_end(&mut errors)
            .map_err(|e| SessionError::command(address, e))?;

        channel
            .wait_close()
            .map_err(|e| SessionError::command(address, e))?;
        let code = channel
            .exit_status()
            .map_err(|e| SessionError::command(address, e))?;

        debug!(
            address,
            code,
            stdout_bytes = output.len(),
            stderr_bytes = errors.len(),
            "Remote command finished"
        );
        Ok(ExitStatus::new(code))
    }
}

/// Disconnects the wrapped session when dropped, whichever way `execute` exits.
struct ClosingSession {
    inner: Session,
}

impl ClosingSession {
    fn new(inner: Session) -> Self {
        Self { inner }
    }
}

impl Deref for ClosingSession {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.inner
    }
}

impl DerefMut for ClosingSession {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.inner
    }
}

impl Drop for ClosingSession {
    fn drop(&mut self) {
        if let Err(e) = self.inner.disconnect(None, "session finished", None) {
            debug!(error = %e, "SSH disconnect did not complete cleanly");
        }
    }
}
