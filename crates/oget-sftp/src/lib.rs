//! # oget – SFTP mailbox
//!
//! Drop-and-collect retrieval over an authenticated session:
//!   • `RemoteFs`, the list / open / remove seam, and its SFTP implementation
//!   • Remote path normalisation and local file-name safety
//!   • The sequential transfer-then-remove loop with per-file failure isolation

pub mod sftp;
