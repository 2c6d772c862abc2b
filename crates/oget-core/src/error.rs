//! Stage-tagged error type shared by every crate in the workspace.

use std::fmt;

/// The pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Dial,
    Handshake,
    Channel,
    LocalStorage,
    Listing,
    Transfer,
    Remove,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Dial => "dial",
            Stage::Handshake => "handshake",
            Stage::Channel => "channel setup",
            Stage::LocalStorage => "local storage",
            Stage::Listing => "listing",
            Stage::Transfer => "transfer",
            Stage::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Categorised failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OgetErrorKind {
    /// The SOCKS proxy itself could not be reached.
    ProxyUnreachable,
    /// The proxy answered with something that is not valid SOCKS5.
    ProxyProtocol,
    /// The proxy was reached but could not relay to the target.
    TargetUnreachable,
    /// Dial + handshake did not finish inside the connect budget.
    ConnectTimeout,
    /// SSH protocol negotiation failed.
    HandshakeFailed,
    /// The server refused the credentials.
    AuthenticationRejected,
    /// The SFTP subsystem could not be started on the session.
    ChannelSetupFailed,
    DirectoryNotFound,
    PermissionDenied,
    /// The local destination root could not be created.
    LocalStorageUnavailable,
    OpenFailed,
    CreateFailed,
    CopyFailed,
    RemoveFailed,
    /// A listed name that cannot be mapped to a single local file name.
    UnsafeEntryName,
    InvalidConfig,
    /// Local I/O failure outside the categories above.
    Io,
    /// Remote failure outside the categories above.
    Remote,
}

pub type OgetResult<T> = Result<T, OgetError>;

#[derive(Debug, Clone)]
pub struct OgetError {
    pub kind: OgetErrorKind,
    pub stage: Stage,
    pub message: String,
}

// ── Construction helpers ─────────────────────────────────────────────

impl OgetError {
    pub fn new(kind: OgetErrorKind, stage: Stage, msg: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: msg.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::InvalidConfig, Stage::Config, msg)
    }

    pub fn proxy_unreachable(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::ProxyUnreachable, Stage::Dial, msg)
    }

    pub fn proxy_protocol(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::ProxyProtocol, Stage::Dial, msg)
    }

    pub fn target_unreachable(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::TargetUnreachable, Stage::Dial, msg)
    }

    pub fn connect_timeout(stage: Stage, msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::ConnectTimeout, stage, msg)
    }

    pub fn handshake_failed(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::HandshakeFailed, Stage::Handshake, msg)
    }

    pub fn auth_rejected(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::AuthenticationRejected, Stage::Handshake, msg)
    }

    pub fn channel_setup(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::ChannelSetupFailed, Stage::Channel, msg)
    }

    pub fn local_storage(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::LocalStorageUnavailable, Stage::LocalStorage, msg)
    }

    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::OpenFailed, Stage::Transfer, msg)
    }

    pub fn create_failed(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::CreateFailed, Stage::Transfer, msg)
    }

    pub fn copy_failed(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::CopyFailed, Stage::Transfer, msg)
    }

    pub fn remove_failed(msg: impl Into<String>) -> Self {
        Self::new(OgetErrorKind::RemoveFailed, Stage::Remove, msg)
    }

    pub fn unsafe_entry_name(name: &str) -> Self {
        Self::new(
            OgetErrorKind::UnsafeEntryName,
            Stage::Transfer,
            format!("refusing to map remote entry '{}' to a local path", name),
        )
    }

    /// Per-file errors are recoverable at the run level; everything else ends
    /// the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.stage, Stage::Transfer | Stage::Remove)
    }
}

impl fmt::Display for OgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: [{:?}] {}", self.stage, self.kind, self.message)
    }
}

impl std::error::Error for OgetError {}
