// ── Mailbox processor – transfer-then-remove, one file at a time ─────────────
//
// Run: Init → LocalDirReady → Listing → ProcessingEntries → Done.
// Failures before ProcessingEntries end the run; failures inside it only end
// the file they belong to.

use crate::sftp::handle::RemoteFs;
use crate::sftp::paths::{ensure_local_root, local_file_name};
use crate::sftp::types::*;
use chrono::Utc;
use log::{debug, info, warn};
use oget_core::{OgetError, OgetResult, Stage};
use std::fs::File;
use std::io;
use std::path::Path;

/// Collect every non-directory entry of the mailbox into `config.local_dir`,
/// deleting each remote file once its local copy is complete.
pub fn process_mailbox<F: RemoteFs + ?Sized>(fs: &F, config: &MailboxConfig) -> OgetResult<RunReport> {
    let mut processor = MailboxProcessor {
        fs,
        config,
        state: RunState::Init,
        report: RunReport::started(),
    };
    processor.run()?;
    Ok(processor.report)
}

/// Copy `remote_path` to `local_path`, then delete the remote file. The delete
/// is only issued after both ends of the copy are closed without error.
pub fn transfer_and_remove<F: RemoteFs + ?Sized>(
    fs: &F,
    remote_path: &str,
    local_path: &Path,
) -> OgetResult<u64> {
    let bytes = transfer_file(fs, remote_path, local_path)?;
    fs.remove(remote_path)?;
    Ok(bytes)
}

fn transfer_file<F: RemoteFs + ?Sized>(fs: &F, remote_path: &str, local_path: &Path) -> OgetResult<u64> {
    let mut source = fs.open_for_read(remote_path)?;

    let mut destination = File::create(local_path).map_err(|e| {
        OgetError::create_failed(format!("create '{}' failed: {}", local_path.display(), e))
    })?;

    let bytes = io::copy(&mut source, &mut destination).map_err(|e| {
        OgetError::copy_failed(format!("copy '{}' failed: {}", remote_path, e))
    })?;

    destination.sync_all().map_err(|e| {
        OgetError::copy_failed(format!("flush '{}' failed: {}", local_path.display(), e))
    })?;

    drop(destination);
    drop(source);
    Ok(bytes)
}

struct MailboxProcessor<'a, F: RemoteFs + ?Sized> {
    fs: &'a F,
    config: &'a MailboxConfig,
    state: RunState,
    report: RunReport,
}

impl<F: RemoteFs + ?Sized> MailboxProcessor<'_, F> {
    fn run(&mut self) -> OgetResult<()> {
        // Nothing remote is touched until the destination exists.
        ensure_local_root(&self.config.local_dir)?;
        self.transition(RunState::LocalDirReady);

        self.transition(RunState::Listing);
        let remote_dir = self.config.remote_dir.clone();
        let entries = self.fs.list_directory(remote_dir.as_str())?;
        self.report.listed = entries.len();

        if entries.is_empty() {
            info!("No files found in remote directory {}", remote_dir);
        }

        self.transition(RunState::ProcessingEntries);
        for entry in entries {
            if entry.name == "." || entry.name == ".." {
                continue;
            }
            if entry.is_dir() {
                debug!("Skipping directory {}", entry.name);
                self.report.skipped_directories.push(entry.name);
                continue;
            }
            self.process_entry(&entry);
        }

        self.report.finished_at = Utc::now();
        self.transition(RunState::Done);
        Ok(())
    }

    fn process_entry(&mut self, entry: &RemoteEntry) {
        let remote_path = self.config.remote_dir.join(&entry.name);

        let local_name = match local_file_name(&entry.name) {
            Ok(name) => name,
            Err(e) => {
                self.record_failure(entry, remote_path, e, false);
                return;
            }
        };
        let local_path = self.config.local_dir.join(local_name);

        let bytes = match transfer_and_remove(self.fs, &remote_path, &local_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                // Only a failed delete leaves a complete local copy behind.
                let local_copy_kept = e.stage == Stage::Remove;
                self.record_failure(entry, remote_path, e, local_copy_kept);
                return;
            }
        };

        info!("Successfully processed: {} ({} bytes)", entry.name, bytes);
        self.report.transferred.push(TransferredFile {
            name: entry.name.clone(),
            local_path,
            bytes,
        });
    }

    fn record_failure(&mut self, entry: &RemoteEntry, remote_path: String, error: OgetError, local_copy_kept: bool) {
        if local_copy_kept {
            warn!(
                "Failed to process {}: {} (local copy kept, may be delivered again)",
                entry.name, error
            );
        } else {
            warn!("Failed to process {}: {}", entry.name, error);
        }
        self.report.failures.push(FileFailure {
            name: entry.name.clone(),
            remote_path,
            error,
            local_copy_kept,
        });
    }

    fn transition(&mut self, next: RunState) {
        debug!("Mailbox run {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
