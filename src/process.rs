//! Helper-process construction and exit-status capture
//!
//! The privilege-dropping helper is an external executable: it receives the
//! target uid, target gid and the init path as positional arguments, runs
//! with the home directory as its working directory and an empty
//! environment, and performs the actual confinement and identity downgrade
//! before exec. This module only builds, spawns and reaps that process.

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};

use std::os::unix::process::ExitStatusExt;

use log::debug;
use nix::sys::signal::Signal;

use crate::errors::Result;

/// One invocation of the privilege-dropping helper
#[derive(Debug, Clone)]
pub struct HelperCommand {
    /// Helper executable
    pub helper: PathBuf,
    /// Target user id (owner of the home directory)
    pub uid: libc::uid_t,
    /// Target group id (owning group of the home directory)
    pub gid: libc::gid_t,
    /// Init program path, relative to the home directory
    pub init: PathBuf,
    /// Home directory the helper runs in
    pub home: PathBuf,
}

impl HelperCommand {
    /// Build the command
    ///
    /// Exactly three positional arguments, working directory set to the
    /// home path, an explicitly empty environment (the child inherits
    /// nothing from the launcher) and stdio connected straight through.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.helper);
        cmd.arg(self.uid.to_string())
            .arg(self.gid.to_string())
            .arg(&self.init)
            .current_dir(&self.home)
            .env_clear()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Spawn the helper
    pub fn spawn(&self) -> Result<Child> {
        debug!(
            "spawning {} {} {} {} in {}",
            self.helper.display(),
            self.uid,
            self.gid,
            self.init.display(),
            self.home.display()
        );
        Ok(self.command().spawn()?)
    }
}

/// Terminal result of the helper process, forwarded verbatim to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchStatus {
    /// Exit code, if the helper exited normally
    pub code: Option<i32>,
    /// Terminating signal, if the helper was killed
    pub signal: Option<i32>,
}

impl LaunchStatus {
    /// Whether the helper exited with code zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Shell-style exit code: signal deaths map to 128 + signal
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => -1,
        }
    }

    /// Human-readable rendering, naming the signal when possible
    pub fn describe(&self) -> String {
        if let Some(code) = self.code {
            format!("exited with code {}", code)
        } else if let Some(signal) = self.signal {
            match Signal::try_from(signal) {
                Ok(name) => format!("killed by {:?}", name),
                Err(_) => format!("killed by signal {}", signal),
            }
        } else {
            "finished with unknown status".to_string()
        }
    }
}

impl From<ExitStatus> for LaunchStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            signal: status.signal(),
        }
    }
}

/// Wait for the helper and capture its terminal status
pub fn wait_child(child: &mut Child) -> Result<LaunchStatus> {
    Ok(child.wait().map(LaunchStatus::from)?)
}
