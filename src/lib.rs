pub mod cli;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod startup;

pub use cli::Cli;
pub use config::{Config, Overrides, RawConfig};
pub use logging::{init_logging, LogFormat};
