// ── oget-tunnel / tunnel module ───────────────────────────────────────────────

pub mod types;
pub mod socks;
pub mod session;

pub use types::*;
pub use socks::SocksDialer;
pub use session::{connect, SecureSession};
