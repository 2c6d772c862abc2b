// ── SOCKS5 dialer (RFC 1928, no-auth CONNECT) ────────────────────────────────

use log::debug;
use oget_core::{OgetError, OgetErrorKind, OgetResult, Stage};
use std::net::{Ipv4Addr, Ipv6Addr, TcpStream};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream as AsyncTcpStream;

const SOCKS_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_NONE_ACCEPTABLE: u8 = 0xFF;
const CMD_CONNECT: u8 = 0x01;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

/// Opens relayed TCP connections through one SOCKS5 proxy. A single attempt
/// per call, no retries.
#[derive(Debug, Clone)]
pub struct SocksDialer {
    proxy_addr: String,
}

impl SocksDialer {
    pub fn new(proxy_addr: impl Into<String>) -> Self {
        Self {
            proxy_addr: proxy_addr.into(),
        }
    }

    /// Connect to `host:port` through the proxy and return the relayed stream.
    pub async fn connect(&self, host: &str, port: u16) -> OgetResult<AsyncTcpStream> {
        // Validate before touching the network.
        let request = connect_request(host, port)?;

        let mut stream = AsyncTcpStream::connect(&self.proxy_addr)
            .await
            .map_err(|e| {
                OgetError::proxy_unreachable(format!(
                    "Failed to connect to proxy {}: {}",
                    self.proxy_addr, e
                ))
            })?;
        debug!("SOCKS5 proxy {} reached", self.proxy_addr);

        // Greeting: offer "no authentication" only.
        stream
            .write_all(&[SOCKS_VERSION, 0x01, METHOD_NO_AUTH])
            .await
            .map_err(|e| negotiation_error("send SOCKS5 greeting", e))?;

        let mut response = [0u8; 2];
        stream
            .read_exact(&mut response)
            .await
            .map_err(|e| negotiation_error("read SOCKS5 greeting response", e))?;

        if response[0] != SOCKS_VERSION {
            return Err(OgetError::proxy_protocol(format!(
                "Invalid SOCKS5 response version {:#04x}",
                response[0]
            )));
        }
        match response[1] {
            METHOD_NO_AUTH => {}
            METHOD_NONE_ACCEPTABLE => {
                return Err(OgetError::proxy_protocol(
                    "SOCKS5 proxy accepted none of the offered auth methods",
                ))
            }
            other => {
                return Err(OgetError::proxy_protocol(format!(
                    "SOCKS5 proxy selected unsupported auth method {:#04x}",
                    other
                )))
            }
        }

        stream
            .write_all(&request)
            .await
            .map_err(|e| negotiation_error("send SOCKS5 connect request", e))?;

        let mut header = [0u8; 4];
        stream
            .read_exact(&mut header)
            .await
            .map_err(|e| negotiation_error("read SOCKS5 connect response", e))?;

        if header[0] != SOCKS_VERSION {
            return Err(OgetError::proxy_protocol(format!(
                "Invalid SOCKS5 reply version {:#04x}",
                header[0]
            )));
        }
        if header[1] != 0x00 {
            return Err(OgetError::target_unreachable(format!(
                "SOCKS5 connect to {}:{} failed: {} ({:#04x})",
                host,
                port,
                reply_message(header[1]),
                header[1]
            )));
        }

        // Drain the bound address so the caller starts at the relayed bytes.
        let bound_len = match header[3] {
            ATYP_IPV4 => 4,
            ATYP_IPV6 => 16,
            ATYP_DOMAIN => {
                let mut len = [0u8; 1];
                stream
                    .read_exact(&mut len)
                    .await
                    .map_err(|e| negotiation_error("read SOCKS5 bound address", e))?;
                len[0] as usize
            }
            other => {
                return Err(OgetError::proxy_protocol(format!(
                    "SOCKS5 reply carries unknown address type {:#04x}",
                    other
                )))
            }
        };
        let mut bound = vec![0u8; bound_len + 2];
        stream
            .read_exact(&mut bound)
            .await
            .map_err(|e| negotiation_error("read SOCKS5 bound address", e))?;

        debug!("SOCKS5 relay to {}:{} established", host, port);
        Ok(stream)
    }
}

/// Hand a relayed stream over to blocking code (ssh2 drives the socket itself).
pub fn into_blocking(stream: AsyncTcpStream) -> OgetResult<TcpStream> {
    let std_stream = stream
        .into_std()
        .map_err(|e| OgetError::new(OgetErrorKind::Io, Stage::Dial, format!("Failed to convert stream: {}", e)))?;
    std_stream
        .set_nonblocking(false)
        .map_err(|e| OgetError::new(OgetErrorKind::Io, Stage::Dial, format!("Failed to set blocking mode: {}", e)))?;
    Ok(std_stream)
}

/// Build the CONNECT request. IP literals go out as addresses, anything else
/// as a domain name so the proxy resolves it.
pub(crate) fn connect_request(host: &str, port: u16) -> OgetResult<Vec<u8>> {
    let mut request = vec![SOCKS_VERSION, CMD_CONNECT, 0x00];

    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<Ipv4Addr>() {
        request.push(ATYP_IPV4);
        request.extend_from_slice(&ip.octets());
    } else if let Ok(ip) = bare.parse::<Ipv6Addr>() {
        request.push(ATYP_IPV6);
        request.extend_from_slice(&ip.octets());
    } else {
        if host.is_empty() || host.len() > 255 {
            return Err(OgetError::new(
                OgetErrorKind::InvalidConfig,
                Stage::Dial,
                format!("Target host name must be 1..=255 bytes, got {}", host.len()),
            ));
        }
        request.push(ATYP_DOMAIN);
        request.push(host.len() as u8);
        request.extend_from_slice(host.as_bytes());
    }

    request.extend_from_slice(&port.to_be_bytes());
    Ok(request)
}

/// RFC 1928 reply codes plus the onion-service codes Tor adds.
pub(crate) fn reply_message(code: u8) -> &'static str {
    match code {
        0x01 => "General SOCKS server failure",
        0x02 => "Connection not allowed by ruleset",
        0x03 => "Network unreachable",
        0x04 => "Host unreachable",
        0x05 => "Connection refused",
        0x06 => "TTL expired",
        0x07 => "Command not supported",
        0x08 => "Address type not supported",
        0xF0 => "Onion service descriptor can not be found",
        0xF1 => "Onion service descriptor is invalid",
        0xF2 => "Onion service introduction failed",
        0xF3 => "Onion service rendezvous failed",
        0xF4 => "Onion service missing client authorization",
        0xF5 => "Onion service wrong client authorization",
        0xF6 => "Onion service invalid address",
        0xF7 => "Onion service introduction timed out",
        _ => "Unknown SOCKS5 error",
    }
}

fn negotiation_error(action: &str, e: std::io::Error) -> OgetError {
    OgetError::proxy_protocol(format!("Failed to {}: {}", action, e))
}
