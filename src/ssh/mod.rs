// ABOUTME: SSH module: reboot command construction and the remote session executor
// ABOUTME: The RemoteSession trait is the seam between batch logic and the network

pub mod command;
#[cfg(test)]
pub mod mock;
pub mod session;

pub use command::RebootCommand;
pub use session::{ExitStatus, RemoteSession, SshSession};
