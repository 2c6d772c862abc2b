// ── Configuration – JSON file → resolved, immutable run settings ─────────────

use oget_core::{ConnectionTarget, Credentials, OgetError, OgetResult};
use oget_sftp::sftp::{MailboxConfig, RemoteDir};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_REMOTE_DIR: &str = "inbox";
pub const DEFAULT_LOCAL_DIR: &str = "downloads";
pub const DEFAULT_PROXY_ADDR: &str = "127.0.0.1:9050";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 120;

/// The config file as written. Every field is optional here; required-ness
/// and defaults are applied by [`Config::resolve`].
#[derive(Default, Deserialize)]
pub struct RawConfig {
    #[serde(default, alias = "target_address")]
    pub onion_address: Option<String>,
    #[serde(default)]
    pub port: Option<PortValue>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub remote_dir: Option<String>,
    #[serde(default)]
    pub local_dir: Option<String>,
    #[serde(default)]
    pub proxy_addr: Option<String>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

/// Ports are accepted both as JSON numbers and as numeric strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Text(String),
}

/// Values supplied at invocation time that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub proxy_addr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: ConnectionTarget,
    pub credentials: Credentials,
    pub mailbox: MailboxConfig,
    pub connect_timeout: Duration,
}

impl RawConfig {
    pub fn from_json(text: &str) -> OgetResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| OgetError::invalid_config(format!("malformed config: {}", e)))
    }
}

/// Read and resolve the config file at `path`.
pub fn load(path: &Path, overrides: &Overrides) -> OgetResult<Config> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        OgetError::invalid_config(format!("failed to read config file {}: {}", path.display(), e))
    })?;
    let raw = RawConfig::from_json(&text)?;
    let config = Config::resolve(raw, overrides)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

impl Config {
    /// Apply defaults and overrides, then validate. Empty strings count as
    /// absent.
    pub fn resolve(raw: RawConfig, overrides: &Overrides) -> OgetResult<Self> {
        let host = required(raw.onion_address, "onion_address")?;
        let username = required(raw.username, "username")?;
        let password = raw
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| OgetError::invalid_config("missing required field 'password'"))?;

        let port = match raw.port {
            None => DEFAULT_PORT,
            Some(value) => parse_port(&value)?,
        };

        let proxy_addr = non_empty(overrides.proxy_addr.clone())
            .or_else(|| non_empty(raw.proxy_addr))
            .unwrap_or_else(|| DEFAULT_PROXY_ADDR.to_string());
        validate_proxy_addr(&proxy_addr)?;

        let remote_dir = non_empty(raw.remote_dir).unwrap_or_else(|| DEFAULT_REMOTE_DIR.to_string());
        let local_dir = non_empty(raw.local_dir).unwrap_or_else(|| DEFAULT_LOCAL_DIR.to_string());

        let timeout_secs = raw.connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(OgetError::invalid_config("connect_timeout_secs must be greater than 0"));
        }

        Ok(Self {
            target: ConnectionTarget::new(proxy_addr, host, port),
            credentials: Credentials::new(username, password),
            mailbox: MailboxConfig {
                remote_dir: RemoteDir::new(&remote_dir),
                local_dir: PathBuf::from(local_dir),
            },
            connect_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Blank values are absent; anything else is kept verbatim.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, field: &str) -> OgetResult<String> {
    non_empty(value)
        .ok_or_else(|| OgetError::invalid_config(format!("missing required field '{}'", field)))
}

fn parse_port(value: &PortValue) -> OgetResult<u16> {
    let parsed = match value {
        PortValue::Number(n) => u16::try_from(*n).ok(),
        PortValue::Text(s) if s.trim().is_empty() => return Ok(DEFAULT_PORT),
        PortValue::Text(s) => s.trim().parse::<u16>().ok(),
    };
    match parsed {
        Some(port) if port != 0 => Ok(port),
        _ => Err(OgetError::invalid_config(format!("invalid port {:?}", value))),
    }
}

/// `host:port` or `[v6]:port`.
fn validate_proxy_addr(addr: &str) -> OgetResult<()> {
    let invalid = || OgetError::invalid_config(format!("invalid proxy address '{}'", addr));
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(invalid());
    }
    match port.parse::<u16>() {
        Ok(p) if p != 0 => Ok(()),
        _ => Err(invalid()),
    }
}
