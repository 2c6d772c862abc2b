// ── Startup probe hook ───────────────────────────────────────────────────────
//
// Lets a harness confirm the binary starts without giving it a config file.

pub const PROBE_ENV: &str = "OGET_PROBE";
pub const PROBE_MESSAGE: &str = "oget: probe ok";

/// True when `OGET_PROBE=1`.
pub fn probe_requested() -> bool {
    std::env::var(PROBE_ENV).map(|v| v == "1").unwrap_or(false)
}
