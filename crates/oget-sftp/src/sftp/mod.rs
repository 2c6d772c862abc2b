// ── oget-sftp / sftp module ───────────────────────────────────────────────────

pub mod types;
pub mod handle;
pub mod paths;
pub mod mailbox;

pub use types::*;
pub use handle::{RemoteFs, SftpHandle};
pub use paths::{ensure_local_root, local_file_name, normalize_separators, RemoteDir};
pub use mailbox::{process_mailbox, transfer_and_remove};
