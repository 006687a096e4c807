//! Error types for launch operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for launch operations
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Errors that can occur while validating and launching an init program
///
/// A failed or signal-terminated init program is deliberately not an error:
/// the helper's exit status is forwarded to the caller as a value, since
/// judging the init program's outcome is not the launcher's job.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The home directory or the resolved init path does not exist
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    /// Any filesystem or spawn failure other than not-found on a stat,
    /// propagated untranslated
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The init path exists but is not a regular file
    #[error("{} is not a file", path.display())]
    NotAFile { path: PathBuf },

    /// Home directory and init file are owned by different identities
    #[error("{} uid & gid don't match with {}", home.display(), init.display())]
    OwnershipMismatch { home: PathBuf, init: PathBuf },

    /// Launcher configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
