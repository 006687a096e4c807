//! Path validation for the launch pipeline
//!
//! Everything here runs before any process is created: the two metadata
//! queries, the file-type check on the init entry, and the
//! ownership-consistency policy between the home directory and the init
//! file. The checks are plain functions over [`PathStat`] values so the
//! policy can be tested without root privileges.

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::{LaunchError, Result};

/// Metadata snapshot for one path
///
/// Two of these exist per launch, one for the home directory and one for
/// the init file; both are discarded once validation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStat {
    /// Whether the entry is a regular file
    pub is_file: bool,
    /// Owning user id
    pub uid: libc::uid_t,
    /// Owning group id
    pub gid: libc::gid_t,
    /// Permission bits
    pub mode: u32,
}

impl From<&fs::Metadata> for PathStat {
    fn from(meta: &fs::Metadata) -> Self {
        Self {
            is_file: meta.is_file(),
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode(),
        }
    }
}

/// Query metadata for a path
///
/// Not-found becomes [`LaunchError::NotFound`] naming the queried path;
/// every other failure is propagated untranslated.
pub fn stat_path(path: &Path) -> Result<PathStat> {
    match fs::metadata(path) {
        Ok(meta) => {
            let stat = PathStat::from(&meta);
            debug!(
                "stat {}: uid={} gid={} mode={:o}",
                path.display(),
                stat.uid,
                stat.gid,
                stat.mode
            );
            Ok(stat)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LaunchError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(LaunchError::Io(e)),
    }
}

/// Resolve `init` as a child of `home`
///
/// The init path is relative to the home directory by contract, so a
/// leading `/` is interpreted relative to `home`: `("/srv/alice", "/init")`
/// resolves to `/srv/alice/init`.
pub fn join_under(home: &Path, init: &Path) -> PathBuf {
    let rel = init.strip_prefix("/").unwrap_or(init);
    home.join(rel)
}

/// Reject an init entry that exists but is not a regular file
pub fn check_regular_file(stat: &PathStat, path: &Path) -> Result<()> {
    if stat.is_file {
        Ok(())
    } else {
        Err(LaunchError::NotAFile {
            path: path.to_path_buf(),
        })
    }
}

/// Ownership-consistency policy: home directory and init file must share
/// the same owning user and group
///
/// The home's owner is the identity the child is downgraded to; an init
/// file owned by anyone else could run code that owner cannot write, or
/// fail to reach resources it needs. Ownership equality is the cheap proxy
/// for "this init program is trusted by and usable by the home's owner".
pub fn check_ownership(
    home_stat: &PathStat,
    init_stat: &PathStat,
    home: &Path,
    init: &Path,
) -> Result<()> {
    if home_stat.uid != init_stat.uid || home_stat.gid != init_stat.gid {
        return Err(LaunchError::OwnershipMismatch {
            home: home.to_path_buf(),
            init: init.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn stat(uid: libc::uid_t, gid: libc::gid_t, is_file: bool) -> PathStat {
        PathStat {
            is_file,
            uid,
            gid,
            mode: 0o755,
        }
    }

    #[test]
    fn stat_path_reports_missing_path() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("gone");

        let err = stat_path(&missing).unwrap_err();

        assert!(matches!(err, LaunchError::NotFound { .. }));
        assert_eq!(err.to_string(), format!("{} not found", missing.display()));
    }

    #[test]
    fn stat_path_reads_owner_of_created_file() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("init");
        fs::write(&file, "#!/bin/sh\n").unwrap();

        let stat = stat_path(&file).unwrap();

        assert!(stat.is_file);
        assert_eq!(stat.uid, fs::metadata(&file).unwrap().uid());
        assert_eq!(stat.gid, fs::metadata(&file).unwrap().gid());
    }

    #[test]
    fn stat_path_sees_permission_bits() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("init");
        fs::write(&file, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o750)).unwrap();

        let stat = stat_path(&file).unwrap();

        assert_eq!(stat.mode & 0o777, 0o750);
    }

    #[test]
    fn join_under_appends_relative_path() {
        assert_eq!(
            join_under(Path::new("/srv/alice"), Path::new("init")),
            PathBuf::from("/srv/alice/init")
        );
    }

    #[test]
    fn join_under_keeps_leading_slash_inside_home() {
        assert_eq!(
            join_under(Path::new("/srv/alice"), Path::new("/init")),
            PathBuf::from("/srv/alice/init")
        );
    }

    #[test]
    fn join_under_handles_nested_init_path() {
        assert_eq!(
            join_under(Path::new("/srv/alice"), Path::new("bin/start")),
            PathBuf::from("/srv/alice/bin/start")
        );
    }

    #[test]
    fn check_regular_file_accepts_file() {
        assert!(check_regular_file(&stat(0, 0, true), Path::new("/h/init")).is_ok());
    }

    #[test]
    fn check_regular_file_rejects_non_file() {
        let err = check_regular_file(&stat(0, 0, false), Path::new("/h/init")).unwrap_err();
        assert_eq!(err.to_string(), "/h/init is not a file");
    }

    #[test]
    fn check_ownership_accepts_matching_owner() {
        let result = check_ownership(
            &stat(0, 0, false),
            &stat(0, 0, true),
            Path::new("/h"),
            Path::new("init"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn check_ownership_rejects_uid_mismatch() {
        let err = check_ownership(
            &stat(0, 0, false),
            &stat(1, 0, true),
            Path::new("/h"),
            Path::new("init"),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "/h uid & gid don't match with init");
    }

    #[test]
    fn check_ownership_rejects_gid_mismatch() {
        let err = check_ownership(
            &stat(0, 0, false),
            &stat(0, 1, true),
            Path::new("/h"),
            Path::new("init"),
        )
        .unwrap_err();
        assert!(matches!(err, LaunchError::OwnershipMismatch { .. }));
    }

    #[test]
    fn check_ownership_reports_the_relative_init_path() {
        let err = check_ownership(
            &stat(1000, 1000, false),
            &stat(0, 0, true),
            Path::new("/srv/alice"),
            Path::new("/init"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "/srv/alice uid & gid don't match with /init"
        );
    }
}
