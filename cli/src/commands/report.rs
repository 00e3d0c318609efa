use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use color_eyre::eyre::Result;
use tracing::info;

use crate::analysis::analyze;
use crate::config::UserConfig;
use crate::data::ProbeContext;
use crate::render::{render_text, Style};
use crate::report::build_report;

use super::collect_day;

pub fn run(config: UserConfig, json: bool, compact: bool) -> Result<()> {
    let now = Local::now();
    let timeout = Duration::from_secs(config.timeout_secs);
    let config = Arc::new(config);

    let ctx = Arc::new(ProbeContext::new(Arc::clone(&config), now));
    let day = collect_day(ctx, timeout)?;

    let analysis = analyze(&day, &config, now.naive_local());
    let report = build_report(&day, &analysis, now);
    info!(
        status = ?report.status,
        score = analysis.fragmentation.score,
        warnings = report.burnout_warnings.len(),
        "Report built"
    );

    if json {
        let doc = if compact {
            serde_json::to_string(&report)?
        } else {
            serde_json::to_string_pretty(&report)?
        };
        println!("{}", doc);
    } else {
        print!("{}", render_text(&report, Style::detect()));
    }

    Ok(())
}
