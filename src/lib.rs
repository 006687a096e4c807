//! initjail: home-directory init launcher
//!
//! Runs a home directory's init program under the identity of the
//! directory's owner, through an external privilege-dropping helper that
//! confines the process to the home directory before exec. The library
//! validates the home/init pair (existence, file type, ownership
//! consistency) and refuses to create any process until every check has
//! passed.
//!
//! # Modules
//!
//! - **validate**: path metadata queries and launch policy checks
//! - **process**: helper-process construction and exit-status capture
//! - **launcher**: launch orchestration and completion handles
//! - **utils**: identity helpers for deployment checks
//!
//! # Example
//!
//! ```ignore
//! use initjail::LauncherBuilder;
//!
//! let launcher = LauncherBuilder::new()
//!     .helper_path("/usr/libexec/initjail-helper")
//!     .build()?;
//!
//! let status = launcher.launch("/srv/homes/alice".as_ref(), "init".as_ref())?;
//! println!("init {}", status.describe());
//! ```

// Core modules
pub mod errors;
pub mod utils;

// Launch pipeline
pub mod process;
pub mod validate;

// Orchestration
pub mod launcher;

// Public API
pub use errors::{LaunchError, Result};
pub use launcher::{LaunchHandle, Launcher, LauncherBuilder, LauncherConfig};
pub use process::{HelperCommand, LaunchStatus};
pub use validate::PathStat;

#[cfg(test)]
mod tests {
    use crate::LauncherBuilder;

    #[test]
    fn test_module_imports() {
        // Verify core API is accessible
        let _builder = LauncherBuilder::new();
    }
}

#[cfg(test)]
pub mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    pub fn serial_guard() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
