use crate::config::Overrides;
use crate::logging::LogFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Collect every file from a remote SFTP mailbox behind a SOCKS proxy, then
/// remove it remotely.
#[derive(Parser, Debug)]
#[command(name = "oget")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// SOCKS5 proxy address (overrides config)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            proxy_addr: self.proxy.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["oget"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(cli.proxy.is_none());
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "oget",
            "-c",
            "/etc/oget.json",
            "--proxy",
            "127.0.0.1:9150",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/oget.json"));
        assert_eq!(cli.overrides().proxy_addr.as_deref(), Some("127.0.0.1:9150"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["oget", "--parallel"]).is_err());
    }
}
