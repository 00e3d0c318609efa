//! Plain-text rendering of a `DayReport`.

use std::fmt::Write;
use std::io::IsTerminal;
use std::time::Duration;

use bytesize::ByteSize;
use daytrace_protocol::{DayReport, FragmentationLevel, Severity};

/// Presentation settings, passed down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub ansi: bool,
}

impl Style {
    #[cfg(test)]
    pub const PLAIN: Style = Style { ansi: false };

    /// ANSI on when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        Style {
            ansi: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.ansi {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn severity(&self, severity: Severity) -> String {
        let code = match severity {
            Severity::High => "31",
            Severity::Medium => "33",
            Severity::Low => "36",
        };
        self.paint(code, severity.label())
    }

    fn level(&self, level: FragmentationLevel) -> String {
        let code = match level {
            FragmentationLevel::Focused => "32",
            FragmentationLevel::Moderate => "33",
            FragmentationLevel::Fragmented => "31",
        };
        self.paint(code, level.label())
    }
}

/// Minutes as a human duration, e.g. "2h 37m".
pub fn format_minutes(minutes: u64) -> String {
    if minutes == 0 {
        return "0m".to_string();
    }
    humantime::format_duration(Duration::from_secs(minutes * 60)).to_string()
}

/// Bytes with SI units, e.g. "1.5 MB".
pub fn format_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).display().si().to_string()
}

pub fn render_text(report: &DayReport, style: Style) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        style.heading("daytrace"),
        style.dim(&report.date)
    );

    if report.is_empty() {
        let _ = writeln!(out, "No activity data could be read for today.");
        render_unavailable(&mut out, report, style);
        return out;
    }

    if let Some(uptime) = &report.uptime {
        let _ = writeln!(out, "\n{}", style.heading("Uptime"));
        let _ = writeln!(out, "  awake     {}", format_minutes(uptime.awake_minutes));
        let _ = writeln!(out, "  asleep    {}", format_minutes(uptime.sleep_minutes));
        let _ = writeln!(out, "  up        {}", format_minutes(uptime.uptime_minutes));
    }

    if let Some(screen) = &report.screen {
        let _ = writeln!(out, "\n{}", style.heading("Screen"));
        let _ = writeln!(
            out,
            "  on        {} ({} sessions)",
            format_minutes(screen.screen_on_minutes),
            screen.display_on_events
        );
    }

    if let Some(battery) = &report.battery {
        let _ = writeln!(out, "\n{}", style.heading("Battery"));
        let _ = writeln!(
            out,
            "  {:.0}% {}, health {:.0}%",
            battery.charge_percent, battery.state, battery.health_percent
        );
        if let Some(cycles) = battery.cycle_count {
            let _ = writeln!(out, "  {} cycles", cycles);
        }
    }

    if let Some(apps) = &report.apps {
        let _ = writeln!(out, "\n{}", style.heading("Apps"));
        let _ = writeln!(
            out,
            "  {} apps, {} active",
            apps.unique_apps,
            format_minutes(apps.active_minutes)
        );
        for app in &apps.top_apps {
            let _ = writeln!(out, "  {:<24} {}", app.name, format_minutes(app.minutes));
        }
    }

    if let Some(focus) = &report.focus {
        let _ = writeln!(out, "\n{}", style.heading("Focus"));
        if let Some(streak) = &focus.longest_streak {
            let _ = writeln!(
                out,
                "  longest streak   {} in {}",
                format_minutes(streak.minutes),
                streak.subject
            );
        }
        if let Some(switching) = &focus.switching {
            let _ = writeln!(
                out,
                "  app switches     {} ({:.1}/h, {:.1}m apart)",
                switching.switches, switching.switches_per_hour, switching.avg_mins_between
            );
        }
        let _ = writeln!(
            out,
            "  longest no-break {}",
            format_minutes(focus.longest_no_break_minutes)
        );
    }

    if let Some(media) = &report.media {
        let _ = writeln!(out, "\n{}", style.heading("Media"));
        let _ = writeln!(out, "  listening {}", format_minutes(media.listening_minutes));
        for source in &media.top_sources {
            let _ = writeln!(out, "  {:<24} {}", source.name, format_minutes(source.minutes));
        }
    }

    if let Some(browsers) = &report.browsers {
        let _ = writeln!(out, "\n{}", style.heading("Browsers"));
        let _ = writeln!(
            out,
            "  {} tabs across {} domains",
            browsers.total_tabs, browsers.unique_domains
        );
        for browser in &browsers.browsers {
            let _ = writeln!(out, "  {:<24} {} tabs", browser.name, browser.tabs);
        }
        for domain in &browsers.top_domains {
            let _ = writeln!(
                out,
                "  {:<24} {} visits {}",
                domain.domain,
                domain.visits,
                style.dim(domain.category.label())
            );
        }
    }

    if let Some(network) = &report.network {
        let _ = writeln!(out, "\n{}", style.heading("Network"));
        let _ = writeln!(
            out,
            "  down {}  up {}",
            format_bytes(network.received_bytes),
            format_bytes(network.sent_bytes)
        );
    }

    if let Some(notifications) = &report.notifications {
        let _ = writeln!(out, "\n{}", style.heading("Notifications"));
        let _ = writeln!(out, "  {} delivered", notifications.total);
        for app in &notifications.top_apps {
            let _ = writeln!(out, "  {:<24} {}", app.name, app.count);
        }
    }

    if let Some(issues) = &report.issues {
        let _ = writeln!(out, "\n{}", style.heading("Issues"));
        let _ = writeln!(out, "  {} reports", issues.total);
        for process in &issues.by_process {
            let _ = writeln!(out, "  {:<24} {}", process.name, process.count);
        }
    }

    if let Some(fragmentation) = &report.fragmentation {
        let _ = writeln!(out, "\n{}", style.heading("Fragmentation"));
        let _ = writeln!(
            out,
            "  {}/100 {}",
            fragmentation.score,
            style.level(fragmentation.level)
        );
    }

    if !report.burnout_warnings.is_empty() {
        let _ = writeln!(out, "\n{}", style.heading("Warnings"));
        for warning in &report.burnout_warnings {
            let _ = writeln!(
                out,
                "  [{}] {}",
                style.severity(warning.severity),
                warning.message
            );
        }
    }

    render_unavailable(&mut out, report, style);
    out
}

fn render_unavailable(out: &mut String, report: &DayReport, style: Style) {
    if report.unavailable.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}", style.dim("Unavailable"));
    for source in &report.unavailable {
        let _ = writeln!(out, "  {:<14} {}", source.source, style.dim(&source.reason));
        if let Some(hint) = &source.hint {
            let _ = writeln!(out, "  {:<14} {}", "", style.dim(hint));
        }
    }
}
