//! Launch orchestration
//!
//! A [`Launcher`] owns the resolved helper path and exposes the single
//! entry point of the crate: validate a home/init pair, then run the
//! privilege-dropping helper inside the home directory. Validation always
//! completes before any process exists; the first failed check wins and
//! nothing is spawned after it.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use log::debug;

use crate::errors::{LaunchError, Result};
use crate::process::{wait_child, HelperCommand, LaunchStatus};
use crate::validate;

/// Name of the helper executable expected next to the launcher itself
pub const HELPER_NAME: &str = "initjail-helper";

/// Launcher configuration
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Path to the privilege-dropping helper executable
    pub helper_path: PathBuf,
}

impl LauncherConfig {
    /// Configuration with an explicit helper path
    pub fn new(helper_path: impl Into<PathBuf>) -> Self {
        Self {
            helper_path: helper_path.into(),
        }
    }

    /// Resolve the helper at its well-known installed location, next to
    /// the current executable
    pub fn installed() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(dir.join(HELPER_NAME)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.helper_path.as_os_str().is_empty() {
            return Err(LaunchError::InvalidConfig(
                "helper path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder pattern for launcher creation
#[derive(Default)]
pub struct LauncherBuilder {
    helper_path: Option<PathBuf>,
}

impl LauncherBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit helper path
    pub fn helper_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.helper_path = Some(path.into());
        self
    }

    /// Build the launcher, resolving the installed helper location when no
    /// explicit path was given
    pub fn build(self) -> Result<Launcher> {
        let config = match self.helper_path {
            Some(path) => LauncherConfig::new(path),
            None => LauncherConfig::installed()?,
        };
        Launcher::new(config)
    }
}

/// Validates home/init pairs and runs the privilege-dropping helper
pub struct Launcher {
    config: LauncherConfig,
}

impl Launcher {
    /// Create a launcher from a configuration
    pub fn new(config: LauncherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create new builder
    pub fn builder() -> LauncherBuilder {
        LauncherBuilder::new()
    }

    /// Path of the helper this launcher invokes
    pub fn helper_path(&self) -> &Path {
        &self.config.helper_path
    }

    /// Validate `home` and `init` and run the helper to completion
    ///
    /// `init` is resolved as a child of `home`. On success the helper's
    /// terminal status is returned verbatim; a non-zero exit or a signal
    /// death is not a launcher error. On any validation failure no process
    /// is created.
    pub fn launch(&self, home: &Path, init: &Path) -> Result<LaunchStatus> {
        let invocation = self.prepare(home, init)?;
        let mut child = invocation.spawn()?;
        let status = wait_child(&mut child)?;
        debug!("helper for {} {}", home.display(), status.describe());
        Ok(status)
    }

    /// Start a launch on its own worker thread
    ///
    /// The outcome is delivered through the returned handle exactly once.
    /// Concurrent launches are fully independent: each owns its stat
    /// results, its channel and, on success, its child process.
    pub fn spawn_launch(&self, home: &Path, init: &Path) -> LaunchHandle {
        let launcher = Self {
            config: self.config.clone(),
        };
        let home = home.to_path_buf();
        let init = init.to_path_buf();
        let (tx, rx) = channel();

        thread::spawn(move || {
            // The receiver may already be gone; the outcome is dropped then
            let _ = tx.send(launcher.launch(&home, &init));
        });

        LaunchHandle { receiver: rx }
    }

    /// Run the validation pipeline and return the ready-to-spawn helper
    /// invocation
    ///
    /// Checks run in order: home stat, init stat, init file type, ownership
    /// consistency. The home entry is deliberately never type-checked as a
    /// directory, and the init file's execute bits are left for the helper
    /// to trip over.
    fn prepare(&self, home: &Path, init: &Path) -> Result<HelperCommand> {
        let home_stat = validate::stat_path(home)?;

        let init_path = validate::join_under(home, init);
        let init_stat = validate::stat_path(&init_path)?;

        validate::check_regular_file(&init_stat, &init_path)?;
        validate::check_ownership(&home_stat, &init_stat, home, init)?;

        Ok(HelperCommand {
            helper: self.config.helper_path.clone(),
            uid: home_stat.uid,
            gid: home_stat.gid,
            init: init.to_path_buf(),
            home: home.to_path_buf(),
        })
    }
}

/// Handle for one in-flight launch
///
/// The single-fire counterpart of the completion callback: the launch
/// outcome arrives through the channel exactly once, whether the pipeline
/// failed validation or the helper ran to completion.
pub struct LaunchHandle {
    receiver: Receiver<Result<LaunchStatus>>,
}

impl LaunchHandle {
    /// Block until the launch completes, consuming the handle
    pub fn wait(self) -> Result<LaunchStatus> {
        match self.receiver.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(LaunchError::Io(io::Error::other(
                "launch worker disconnected",
            ))),
        }
    }

    /// Check for completion without blocking
    pub fn try_wait(&self) -> Option<Result<LaunchStatus>> {
        self.receiver.try_recv().ok()
    }
}
