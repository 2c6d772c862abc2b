// ── Pipeline – dial → session → SFTP channel → mailbox run ───────────────────

use crate::config::Config;
use log::{debug, info};
use oget_core::OgetResult;
use oget_sftp::sftp::{process_mailbox, RunReport, SftpHandle};
use oget_tunnel::tunnel;

/// One complete run. Any error returned here is fatal; per-file failures are
/// inside the report.
pub async fn run(config: &Config) -> OgetResult<RunReport> {
    let session = tunnel::connect(&config.target, &config.credentials, config.connect_timeout).await?;

    let report = {
        let handle = SftpHandle::open(&session)?;
        info!(
            "Collecting {} into {}",
            config.mailbox.remote_dir,
            config.mailbox.local_dir.display()
        );
        process_mailbox(&handle, &config.mailbox)?
    };

    debug!("Closing session {:?}", session.info());
    Ok(report)
}
