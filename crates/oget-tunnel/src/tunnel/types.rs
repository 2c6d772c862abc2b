// ── Types ─────────────────────────────────────────────────────────────────────

use chrono::{DateTime, Utc};

/// Facts about an established session, logged once after connect.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub host: String,
    pub port: u16,
    pub proxy_addr: String,
    pub username: String,
    /// `"password"` or `"keyboard-interactive"`.
    pub auth_method: String,
    pub server_banner: Option<String>,
    /// OpenSSH-style `SHA256:...` fingerprint of the unverified host key.
    pub host_key_fingerprint: Option<String>,
    pub connected_at: DateTime<Utc>,
}
