// ── File-transfer handle – list / open / remove over one SFTP channel ────────

use crate::sftp::types::{EntryType, RemoteEntry};
use log::debug;
use oget_core::{OgetError, OgetErrorKind, OgetResult, Stage};
use oget_tunnel::tunnel::SecureSession;
use ssh2::{ErrorCode, FileStat, Sftp};
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

// SFTP status codes (draft-ietf-secsh-filexfer-02).
const FX_NO_SUCH_FILE: i32 = 2;
const FX_PERMISSION_DENIED: i32 = 3;
const FX_NO_SUCH_PATH: i32 = 10;

/// The filesystem operations the mailbox processor needs from the remote
/// side. Listing order is whatever the server yields.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteFs {
    fn list_directory(&self, path: &str) -> OgetResult<Vec<RemoteEntry>>;

    /// The returned stream is closed when dropped.
    fn open_for_read(&self, path: &str) -> OgetResult<Box<dyn Read>>;

    /// Not idempotent: removing a missing path is an error.
    fn remove(&self, path: &str) -> OgetResult<()>;
}

/// An SFTP channel bound to one session. Borrowing the session means the
/// handle can never outlive it.
pub struct SftpHandle<'s> {
    sftp: Sftp,
    _session: PhantomData<&'s SecureSession>,
}

impl<'s> SftpHandle<'s> {
    pub fn open(session: &'s SecureSession) -> OgetResult<Self> {
        let sftp = session
            .raw()
            .sftp()
            .map_err(|e| OgetError::channel_setup(format!("SFTP channel error: {}", e)))?;
        debug!("SFTP channel opened to {}", session.info().host);
        Ok(Self {
            sftp,
            _session: PhantomData,
        })
    }
}

impl RemoteFs for SftpHandle<'_> {
    fn list_directory(&self, path: &str) -> OgetResult<Vec<RemoteEntry>> {
        let dir = Path::new(path);
        let raw_entries = self
            .sftp
            .readdir(dir)
            .map_err(|e| list_error(path, &e))?;

        Ok(raw_entries
            .into_iter()
            .map(|(entry_path, stat)| {
                // Keep the name exactly as listed, separators included, so the
                // caller can refuse names that do not map to one local file.
                let name = entry_path
                    .strip_prefix(dir)
                    .ok()
                    .map(|p| p.to_string_lossy().to_string())
                    .or_else(|| entry_path.file_name().map(|n| n.to_string_lossy().to_string()))
                    .unwrap_or_default();
                RemoteEntry::new(name, entry_type_from_stat(&stat))
            })
            .collect())
    }

    fn open_for_read(&self, path: &str) -> OgetResult<Box<dyn Read>> {
        let file = self.sftp.open(Path::new(path)).map_err(|e| {
            OgetError::open_failed(format!("open '{}' failed: {}", path, describe(&e)))
        })?;
        Ok(Box::new(file))
    }

    fn remove(&self, path: &str) -> OgetResult<()> {
        self.sftp.unlink(Path::new(path)).map_err(|e| {
            OgetError::remove_failed(format!("delete '{}' failed: {}", path, describe(&e)))
        })
    }
}

impl Drop for SftpHandle<'_> {
    fn drop(&mut self) {
        debug!("SFTP channel closed");
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

pub(crate) fn entry_type_from_stat(stat: &FileStat) -> EntryType {
    let mode = stat.perm.unwrap_or(0);
    match mode & 0o170000 {
        0o040000 => EntryType::Directory,
        0o120000 => EntryType::Symlink,
        0o100000 => EntryType::File,
        0 if stat.is_dir() => EntryType::Directory,
        0 if stat.is_file() => EntryType::File,
        _ => EntryType::Other,
    }
}

fn sftp_status(e: &ssh2::Error) -> Option<i32> {
    match e.code() {
        ErrorCode::SFTP(code) => Some(code),
        ErrorCode::Session(_) => None,
    }
}

pub(crate) fn list_error(path: &str, e: &ssh2::Error) -> OgetError {
    let kind = match sftp_status(e) {
        Some(FX_NO_SUCH_FILE) | Some(FX_NO_SUCH_PATH) => OgetErrorKind::DirectoryNotFound,
        Some(FX_PERMISSION_DENIED) => OgetErrorKind::PermissionDenied,
        _ => OgetErrorKind::Remote,
    };
    OgetError::new(
        kind,
        Stage::Listing,
        format!("failed to read remote directory {}: {}", path, describe(e)),
    )
}

fn describe(e: &ssh2::Error) -> String {
    match sftp_status(e) {
        Some(FX_NO_SUCH_FILE) | Some(FX_NO_SUCH_PATH) => format!("no such file ({})", e),
        Some(FX_PERMISSION_DENIED) => format!("permission denied ({})", e),
        _ => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(perm: Option<u32>) -> FileStat {
        FileStat {
            size: None,
            uid: None,
            gid: None,
            perm,
            atime: None,
            mtime: None,
        }
    }

    #[test]
    fn test_entry_type_from_mode_bits() {
        assert_eq!(entry_type_from_stat(&stat(Some(0o040755))), EntryType::Directory);
        assert_eq!(entry_type_from_stat(&stat(Some(0o100644))), EntryType::File);
        assert_eq!(entry_type_from_stat(&stat(Some(0o120777))), EntryType::Symlink);
        assert_eq!(entry_type_from_stat(&stat(Some(0o010644))), EntryType::Other);
    }

    #[test]
    fn test_entry_type_without_permissions() {
        assert_eq!(entry_type_from_stat(&stat(None)), EntryType::Other);
    }

    #[test]
    fn test_list_error_missing_directory() {
        let e = ssh2::Error::new(ErrorCode::SFTP(FX_NO_SUCH_FILE), "no such file");
        let err = list_error("inbox", &e);
        assert_eq!(err.kind, OgetErrorKind::DirectoryNotFound);
        assert_eq!(err.stage, Stage::Listing);
        assert!(err.message.contains("inbox"));

        let e = ssh2::Error::new(ErrorCode::SFTP(FX_NO_SUCH_PATH), "no such path");
        assert_eq!(list_error("inbox", &e).kind, OgetErrorKind::DirectoryNotFound);
    }

    #[test]
    fn test_list_error_permission_denied() {
        let e = ssh2::Error::new(ErrorCode::SFTP(FX_PERMISSION_DENIED), "denied");
        assert_eq!(list_error("inbox", &e).kind, OgetErrorKind::PermissionDenied);
    }

    #[test]
    fn test_list_error_session_failure_is_remote() {
        let e = ssh2::Error::new(ErrorCode::Session(-7), "socket send");
        assert_eq!(list_error("inbox", &e).kind, OgetErrorKind::Remote);
    }
}
