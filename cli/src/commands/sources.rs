use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use color_eyre::eyre::Result;

use crate::config::UserConfig;
use crate::data::{CollectedDay, ProbeContext, ProbeError, ProbeKind};

use super::collect_day;

/// One line per probe: availability, time taken, and why it failed.
pub fn format_table(day: &CollectedDay) -> String {
    let mut lines = vec![format!("{:<14} {:<12} {:>8}  {}", "SOURCE", "STATUS", "TIME", "DETAIL")];

    for kind in ProbeKind::ALL {
        let (status, detail) = match day.error(kind) {
            None => ("ok", String::new()),
            Some(err @ ProbeError::Timeout { .. }) => ("timeout", err.to_string()),
            Some(err @ ProbeError::ParseFailure { .. }) => ("unparsable", err.to_string()),
            Some(err) => {
                let hint = matches!(err, ProbeError::SourceUnavailable(_))
                    .then(|| kind.hint())
                    .flatten();
                let detail = match hint {
                    Some(hint) => format!("{err} ({hint})"),
                    None => err.to_string(),
                };
                ("unavailable", detail)
            }
        };
        let elapsed = day
            .elapsed(kind)
            .map(|d| format!("{}ms", d.as_millis()))
            .unwrap_or_else(|| "-".to_string());

        lines.push(
            format!("{:<14} {:<12} {:>8}  {}", kind.name(), status, elapsed, detail)
                .trim_end()
                .to_string(),
        );
    }

    lines.join("\n")
}

pub fn run(config: UserConfig) -> Result<()> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let ctx = Arc::new(ProbeContext::new(Arc::new(config), Local::now()));
    let day = collect_day(ctx, timeout)?;

    println!("{}", format_table(&day));
    println!(
        "\n{} of {} sources available",
        day.available_count(),
        ProbeKind::ALL.len()
    );

    Ok(())
}
