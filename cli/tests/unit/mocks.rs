//! Shared fake host infrastructure for unit tests.
//!
//! `RecordingHost` implements the host ports and writes every call into a
//! shared journal so tests can assert on the exact order of operations.

#![allow(clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use clusterfiles_cli::application::ports::{
    FileTransfer, HostConnector, Privilege, ProgressReporter, ScratchAllocator, ShellExecutor,
};
use clusterfiles_common::HostSpec;

pub type Journal = Rc<RefCell<Vec<String>>>;

/// Host fake: allocates `/tmp/scratch.N`, fails commands containing `fail_on`.
pub struct RecordingHost {
    name: String,
    journal: Journal,
    next: Cell<usize>,
    fail_on: Option<String>,
}

impl RecordingHost {
    fn log(&self, entry: String) {
        self.journal.borrow_mut().push(format!("{}: {entry}", self.name));
    }
}

impl ScratchAllocator for RecordingHost {
    async fn allocate_scratch(&self) -> Result<String> {
        let n = self.next.get() + 1;
        self.next.set(n);
        let path = format!("/tmp/scratch.{n}");
        self.log(format!("mktemp {path}"));
        Ok(path)
    }
}

impl FileTransfer for RecordingHost {
    async fn upload(&self, local: &str, remote: &str) -> Result<()> {
        std::fs::metadata(local)?;
        self.log(format!("upload {local} -> {remote}"));
        Ok(())
    }

    async fn download_url(&self, url: &str, remote: &str) -> Result<()> {
        self.log(format!("download {url} -> {remote}"));
        Ok(())
    }
}

impl ShellExecutor for RecordingHost {
    async fn execute(&self, command: &str, privilege: Privilege) -> Result<()> {
        self.log(format!("{privilege:?} {command}"));
        if let Some(needle) = &self.fail_on {
            if command.contains(needle.as_str()) {
                anyhow::bail!("`{command}` exited with status 1: permission denied");
            }
        }
        Ok(())
    }
}

/// Connector handing out `RecordingHost`s that share one journal.
#[derive(Default)]
pub struct RecordingConnector {
    pub journal: Journal,
    /// `(host address, command substring)` pairs that make execute fail.
    pub failures: Vec<(String, String)>,
}

impl RecordingConnector {
    pub fn entries(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }
}

impl HostConnector for RecordingConnector {
    type Host = RecordingHost;

    fn connect(&self, spec: &HostSpec) -> Result<RecordingHost> {
        let fail_on = self
            .failures
            .iter()
            .find(|(addr, _)| *addr == spec.ssh.address)
            .map(|(_, needle)| needle.clone());
        Ok(RecordingHost {
            name: spec.ssh.address.clone(),
            journal: Rc::clone(&self.journal),
            next: Cell::new(0),
            fail_on,
        })
    }
}

/// Reporter that keeps every message, prefixed with its kind.
#[derive(Default)]
pub struct CollectingReporter {
    pub messages: RefCell<Vec<String>>,
}

impl ProgressReporter for CollectingReporter {
    fn step(&self, message: &str) {
        self.messages.borrow_mut().push(format!("step {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.borrow_mut().push(format!("success {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(format!("warn {message}"));
    }
}
