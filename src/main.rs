use clap::Parser;
use oget_core::OgetError;
use oget_lib::{config, logging, pipeline, startup, Cli};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if startup::probe_requested() {
        println!("{}", startup::PROBE_MESSAGE);
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();
    let logging_ready = match logging::init_logging(cli.verbose, cli.log_format) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("oget: logging unavailable: {}", e);
            false
        }
    };

    let fail = |e: OgetError| {
        if logging_ready {
            error!("{}", e);
        } else {
            eprintln!("oget: {}", e);
        }
        ExitCode::FAILURE
    };

    let config = match config::load(&cli.config, &cli.overrides()) {
        Ok(config) => config,
        Err(e) => return fail(e),
    };

    match pipeline::run(&config).await {
        Ok(report) => {
            if !report.is_clean() {
                warn!(
                    "{} file(s) not collected: {}",
                    report.failures.len(),
                    report
                        .failures
                        .iter()
                        .map(|f| f.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            info!("Run complete: {}", report.summary());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
