//! Tracing subscriber setup for the `oget` binary.
//!
//! The library crates log through the `log` facade; the subscriber installed
//! here bridges those records (via `tracing-log`) into the same stderr sink.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// 0 = info, 1 = debug, 2+ = trace.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Filter directives for our own crates at the given level. Dependencies stay
/// at `warn`.
pub fn default_directives(verbosity: u8) -> String {
    let level = level_for(verbosity);
    format!(
        "warn,oget={l},oget_lib={l},oget_core={l},oget_tunnel={l},oget_sftp={l}",
        l = level
    )
}

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// verbosity-derived filter.
pub fn init_logging(
    verbosity: u8,
    format: LogFormat,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbosity >= 1),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(level_for(0), "info");
        assert_eq!(level_for(1), "debug");
        assert_eq!(level_for(2), "trace");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn test_directives_cover_workspace_crates() {
        let d = default_directives(1);
        for krate in ["oget_core", "oget_tunnel", "oget_sftp", "oget_lib"] {
            assert!(d.contains(&format!("{}=debug", krate)), "{}", d);
        }
        assert!(d.starts_with("warn,"));
        assert!(EnvFilter::try_new(&d).is_ok());
    }
}
