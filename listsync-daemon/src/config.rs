use anyhow::Context;
use listsync_config::load_config;
use listsync_config::shared::DaemonConfig;

/// Loads and validates the daemon configuration.
///
/// Uses the standard configuration loading mechanism from [`listsync_config`]
/// and validates the resulting [`DaemonConfig`] before returning it. Any
/// error here is unrecoverable and terminates the process with a non-zero
/// status before the scheduler starts.
pub fn load_daemon_config() -> anyhow::Result<DaemonConfig> {
    let config = load_config::<DaemonConfig>().context("loading daemon configuration")?;
    config
        .validate()
        .context("validating daemon configuration")?;

    Ok(config)
}
