// ── Types ─────────────────────────────────────────────────────────────────────

use crate::sftp::paths::RemoteDir;
use chrono::{DateTime, Utc};
use oget_core::OgetError;
use std::path::PathBuf;

// ── Remote entries ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Other,
}

/// One name from a directory listing. Not cached or revalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub entry_type: EntryType,
}

impl RemoteEntry {
    pub fn new(name: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            entry_type,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}

// ── Run configuration & state ────────────────────────────────────────────────

/// Source mailbox and destination root for one run.
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    pub remote_dir: RemoteDir,
    pub local_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    LocalDirReady,
    Listing,
    ProcessingEntries,
    Done,
}

// ── Run report ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TransferredFile {
    pub name: String,
    pub local_path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub name: String,
    pub remote_path: String,
    pub error: OgetError,
    /// The local copy exists (the failure was the remote delete), so the next
    /// run may deliver this file again.
    pub local_copy_kept: bool,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub listed: usize,
    pub transferred: Vec<TransferredFile>,
    pub skipped_directories: Vec<String>,
    pub failures: Vec<FileFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub(crate) fn started() -> Self {
        let now = Utc::now();
        Self {
            listed: 0,
            transferred: Vec::new(),
            skipped_directories: Vec::new(),
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.transferred.iter().map(|t| t.bytes).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        let duration_ms = (self.finished_at - self.started_at).num_milliseconds().max(0);
        format!(
            "{} listed, {} transferred ({} bytes), {} directories skipped, {} failed in {} ms",
            self.listed,
            self.transferred.len(),
            self.bytes_transferred(),
            self.skipped_directories.len(),
            self.failures.len(),
            duration_ms
        )
    }
}
