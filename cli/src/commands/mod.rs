pub mod config;
pub mod report;
pub mod sources;

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;

use crate::data::{collect, default_probes, CollectedDay, ProbeContext};

/// Runs the probe catalogue on its own runtime and returns once every
/// probe finished or the deadline passed. Probes still running are left
/// behind rather than delaying exit.
pub fn collect_day(ctx: Arc<ProbeContext>, timeout: Duration) -> Result<CollectedDay> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let probes = default_probes();
    let day = runtime.block_on(collect(ctx, &probes, timeout));
    runtime.shutdown_background();

    Ok(day)
}
