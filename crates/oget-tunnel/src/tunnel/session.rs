// ── SecureSession – SSH handshake + password auth over a relayed stream ──────

use crate::tunnel::socks::{into_blocking, SocksDialer};
use crate::tunnel::types::SessionInfo;
use base64::Engine;
use chrono::Utc;
use log::{debug, info, warn};
use oget_core::{ConnectionTarget, Credentials, OgetError, OgetResult, Stage};
use ssh2::{ErrorCode, HashType, KeyboardInteractivePrompt, Prompt, Session};
use std::net::TcpStream;
use std::time::{Duration, Instant};

/// libssh2's `LIBSSH2_ERROR_TIMEOUT`.
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;

/// An authenticated SSH session. Owns the tunnelled socket; dropping it sends
/// an SSH disconnect and closes the socket.
pub struct SecureSession {
    session: Session,
    info: SessionInfo,
}

impl std::fmt::Debug for SecureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSession").field("info", &self.info).finish()
    }
}

/// Dial `target` through its SOCKS proxy and establish an authenticated
/// session, all inside `timeout`.
pub async fn connect(
    target: &ConnectionTarget,
    credentials: &Credentials,
    timeout: Duration,
) -> OgetResult<SecureSession> {
    let deadline = Instant::now() + timeout;
    info!("Connecting to {}", target);

    let dialer = SocksDialer::new(target.proxy_addr.clone());
    let stream = tokio::time::timeout(timeout, dialer.connect(&target.host, target.port))
        .await
        .map_err(|_| {
            OgetError::connect_timeout(
                Stage::Dial,
                format!("No relay to {} within {:?}", target.authority(), timeout),
            )
        })??;

    let stream = into_blocking(stream)?;
    SecureSession::establish(stream, target, credentials, deadline)
}

impl SecureSession {
    /// Run the SSH handshake and authenticate with password credentials.
    ///
    /// The server host key is accepted without verification; its fingerprint
    /// is logged so it can be pinned by hand.
    pub fn establish(
        stream: TcpStream,
        target: &ConnectionTarget,
        credentials: &Credentials,
        deadline: Instant,
    ) -> OgetResult<Self> {
        let remaining = remaining_budget(deadline, target)?;

        let mut session = Session::new()
            .map_err(|e| OgetError::handshake_failed(format!("Failed to create SSH session: {}", e)))?;
        session.set_tcp_stream(stream);
        session.set_timeout(timeout_ms(remaining));

        session
            .handshake()
            .map_err(|e| classify(deadline, &e, OgetError::handshake_failed(format!("SSH handshake failed: {}", e))))?;

        let banner = session.banner().map(|b| b.to_string());
        let fingerprint = host_key_fingerprint(&session);
        match &fingerprint {
            Some(fp) => warn!(
                "Host key for {} accepted without verification ({})",
                target.authority(),
                fp
            ),
            None => warn!(
                "Host key for {} accepted without verification",
                target.authority()
            ),
        }

        // Refresh the bound so auth only gets what the handshake left over.
        session.set_timeout(timeout_ms(remaining_budget(deadline, target)?));
        let auth_method = authenticate(&session, credentials, deadline)?;

        // Transfers are unbounded.
        session.set_timeout(0);

        let info = SessionInfo {
            host: target.host.clone(),
            port: target.port,
            proxy_addr: target.proxy_addr.clone(),
            username: credentials.username.clone(),
            auth_method,
            server_banner: banner,
            host_key_fingerprint: fingerprint,
            connected_at: Utc::now(),
        };
        info!(
            "SSH session to {} authenticated as '{}' via {}",
            target.authority(),
            info.username,
            info.auth_method
        );

        Ok(Self { session, info })
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// The underlying ssh2 session, for opening sub-channels.
    pub fn raw(&self) -> &Session {
        &self.session
    }
}

impl Drop for SecureSession {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "Client disconnecting", None) {
            debug!("SSH disconnect from {} not clean: {}", self.info.host, e);
        } else {
            debug!("SSH session to {} closed", self.info.host);
        }
    }
}

// ── Authentication ───────────────────────────────────────────────────────────

struct PasswordPrompt<'a> {
    password: &'a str,
}

impl KeyboardInteractivePrompt for PasswordPrompt<'_> {
    fn prompt<'b>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[Prompt<'b>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.to_string()).collect()
    }
}

fn authenticate(session: &Session, credentials: &Credentials, deadline: Instant) -> OgetResult<String> {
    let username = credentials.username.as_str();

    if let Ok(methods) = session.auth_methods(username) {
        debug!("Server offers auth methods: {}", methods);
    }

    let password_err = match session.userauth_password(username, credentials.password()) {
        Ok(()) if session.authenticated() => return Ok("password".to_string()),
        Ok(()) => None,
        Err(e) => Some(e),
    };

    // The fallback only gets what is left of the connect budget.
    let budget = fallback_budget(deadline, password_err.as_ref())?;
    session.set_timeout(timeout_ms(budget));

    // Keyboard-interactive, answering every prompt with the password.
    let mut prompt = PasswordPrompt {
        password: credentials.password(),
    };
    let kbd_err = match session.userauth_keyboard_interactive(username, &mut prompt) {
        Ok(()) if session.authenticated() => return Ok("keyboard-interactive".to_string()),
        Ok(()) => None,
        Err(e) => Some(e),
    };

    Err(auth_failure(username, deadline, password_err, kbd_err))
}

/// Remaining budget for the keyboard-interactive attempt. A password attempt
/// that already timed out, or a spent budget, ends the connect here.
fn fallback_budget(deadline: Instant, password_err: Option<&ssh2::Error>) -> OgetResult<Duration> {
    if password_err.map_or(false, is_libssh2_timeout) {
        return Err(timed_out(Stage::Handshake));
    }
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(timed_out(Stage::Handshake));
    }
    Ok(remaining)
}

/// Both methods refused. Timeouts win over the rejection.
fn auth_failure(
    username: &str,
    deadline: Instant,
    password_err: Option<ssh2::Error>,
    kbd_err: Option<ssh2::Error>,
) -> OgetError {
    if kbd_err.as_ref().map_or(false, is_libssh2_timeout) || Instant::now() >= deadline {
        return timed_out(Stage::Handshake);
    }
    let detail = password_err
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "not authenticated after auth attempt".to_string());
    OgetError::auth_rejected(format!(
        "Password authentication for '{}' failed: {}",
        username, detail
    ))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A failure at or past the deadline, or one libssh2 reports as a timeout, is
/// a connect timeout; anything else keeps its own classification.
fn classify(deadline: Instant, e: &ssh2::Error, otherwise: OgetError) -> OgetError {
    if is_libssh2_timeout(e) || Instant::now() >= deadline {
        timed_out(Stage::Handshake)
    } else {
        otherwise
    }
}

fn is_libssh2_timeout(e: &ssh2::Error) -> bool {
    matches!(e.code(), ErrorCode::Session(LIBSSH2_ERROR_TIMEOUT))
}

fn timed_out(stage: Stage) -> OgetError {
    OgetError::connect_timeout(stage, "Connect budget exhausted before the SSH session was ready")
}

fn remaining_budget(deadline: Instant, target: &ConnectionTarget) -> OgetResult<Duration> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(OgetError::connect_timeout(
            Stage::Handshake,
            format!("Connect budget exhausted before handshake with {}", target.authority()),
        ));
    }
    Ok(remaining)
}

/// ssh2 treats 0 as "no timeout", so never round a live budget down to it.
fn timeout_ms(budget: Duration) -> u32 {
    budget.as_millis().clamp(1, u32::MAX as u128) as u32
}

fn host_key_fingerprint(session: &Session) -> Option<String> {
    session.host_key_hash(HashType::Sha256).map(|hash| {
        format!(
            "SHA256:{}",
            base64::engine::general_purpose::STANDARD_NO_PAD.encode(hash)
        )
    })
}
