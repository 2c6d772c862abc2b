// ── Shared connection types ──────────────────────────────────────────────────

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Where to connect: the SOCKS proxy and the endpoint it should relay to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// `host:port` of the SOCKS5 proxy.
    pub proxy_addr: String,
    pub host: String,
    pub port: u16,
}

impl ConnectionTarget {
    pub fn new(proxy_addr: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            proxy_addr: proxy_addr.into(),
            host: host.into(),
            port,
        }
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.authority(), self.proxy_addr)
    }
}

/// Password credentials. The password is only exposed to the SSH auth call.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_plain_host() {
        let t = ConnectionTarget::new("127.0.0.1:9050", "abcdef.onion", 22);
        assert_eq!(t.authority(), "abcdef.onion:22");
    }

    #[test]
    fn test_authority_brackets_ipv6() {
        let t = ConnectionTarget::new("127.0.0.1:9050", "::1", 2222);
        assert_eq!(t.authority(), "[::1]:2222");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("mail", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("mail"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(creds.password(), "hunter2");
    }
}
