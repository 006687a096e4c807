//! Identity helpers for launcher deployment checks

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Check if running as root
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Get current effective UID
pub fn get_uid() -> u32 {
    unsafe { libc::geteuid() }
}

/// Get current effective GID
pub fn get_gid() -> u32 {
    unsafe { libc::getegid() }
}

/// Check whether a path is a regular file with any execute bit set
pub fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.mode() & 0o111 != 0)
        .unwrap_or(false)
}
