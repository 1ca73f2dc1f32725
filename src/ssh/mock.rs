// ABOUTME: Scripted remote session for exercising batch logic without a network
// ABOUTME: Records every call and answers per address with a canned outcome

use crate::error::SessionError;
use crate::ssh::session::{ExitStatus, RemoteSession};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

#[derive(Clone, Copy, Debug)]
pub enum MockBehavior {
    Exit(i32),
    Unreachable,
    BadPassword,
    ChannelDrop,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCall {
    pub address: String,
    pub username: String,
    pub password: String,
    pub command: String,
}

/// Hosts without a scripted behavior exit with status 0.
#[derive(Default)]
pub struct MockSession {
    behaviors: HashMap<String, MockBehavior>,
    calls: RefCell<Vec<MockCall>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, behavior: MockBehavior) -> Self {
        self.behaviors.insert(address.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    pub fn called_addresses(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.address.clone()).collect()
    }
}

impl RemoteSession for MockSession {
    fn execute(
        &self,
        address: &str,
        username: &str,
        password: &str,
        command: &str,
    ) -> Result<ExitStatus, SessionError> {
        self.calls.borrow_mut().push(MockCall {
            address: address.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            command: command.to_string(),
        });

        match self.behaviors.get(address).copied().unwrap_or(MockBehavior::Exit(0)) {
            MockBehavior::Exit(code) => Ok(ExitStatus::new(code)),
            MockBehavior::Unreachable => Err(SessionError::connect(
                address,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
            MockBehavior::BadPassword => Err(SessionError::auth(
                address,
                username,
                "authentication rejected",
            )),
            MockBehavior::ChannelDrop => Err(SessionError::command(
                address,
                io::Error::new(io::ErrorKind::UnexpectedEof, "channel closed early"),
            )),
        }
    }
}
