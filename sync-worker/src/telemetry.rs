use anyhow::Context;
use metrics_exporter_dogstatsd::DogStatsDBuilder;
use tracing::info;

use crate::types::Environment;

/// Default `DogStatsD` agent port
const DOGSTATSD_PORT: u16 = 8125;

/// Installs the `DogStatsD` recorder behind the `metrics` facade
///
/// Without `DD_AGENT_HOST` no recorder is installed and counters are no-ops.
///
/// # Errors
///
/// Returns an error if the agent address is invalid or a recorder is already installed
pub fn init_metrics(env: &Environment) -> anyhow::Result<()> {
    let Some(agent_host) = env.dd_agent_host() else {
        info!("DD_AGENT_HOST not set, metrics disabled");
        return Ok(());
    };

    let address = format!("{agent_host}:{DOGSTATSD_PORT}");
    DogStatsDBuilder::default()
        .with_remote_address(&address)
        .context("Invalid DogStatsD agent address")?
        .install()
        .context("Failed to install DogStatsD recorder")?;

    info!(%address, "Initialized DogStatsD metrics");

    Ok(())
}
