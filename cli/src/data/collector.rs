//! Runs every probe concurrently under one deadline and gathers whatever
//! finished into a `CollectedDay`.
//!
//! Probes are blocking functions and each runs on tokio's blocking pool.
//! The join waits on them in catalogue order against a shared deadline; the
//! first probe still running at the deadline cancels the shared token so
//! the rest can stop at their next checkpoint. A probe that ignores the
//! token is abandoned, never waited on past the deadline; any database copy
//! it still holds is removed when the run's copy registry is swept.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use daytrace_protocol::{
    AppsSection, BatterySection, BrowsersSection, FocusSection, IssuesSection, MediaSection,
    NetworkSection, NotificationsSection, ScreenSection, UptimeSection,
};
use tokio::time::timeout_at;
use tracing::{debug, info, warn};

use super::probe::{ProbeContext, ProbeError, ProbeKind, Probed};
use super::{apps, battery, browsers, focus, issues, media, network, notifications, screen, uptime};

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutput {
    Uptime(UptimeSection),
    Battery(BatterySection),
    Screen(ScreenSection),
    Apps(AppsSection),
    Focus(FocusSection),
    Media(MediaSection),
    Network(NetworkSection),
    Browsers(BrowsersSection),
    Notifications(NotificationsSection),
    Issues(IssuesSection),
}

pub type ProbeFn = fn(&ProbeContext) -> Probed<ProbeOutput>;

/// One entry of the probe catalogue: which slot it fills and how.
#[derive(Clone, Copy)]
pub struct ProbeDescriptor {
    pub kind: ProbeKind,
    pub run: ProbeFn,
}

pub fn default_probes() -> Vec<ProbeDescriptor> {
    vec![
        ProbeDescriptor {
            kind: ProbeKind::Uptime,
            run: |ctx| uptime::probe(ctx).map(ProbeOutput::Uptime),
        },
        ProbeDescriptor {
            kind: ProbeKind::Battery,
            run: |ctx| battery::probe(ctx).map(ProbeOutput::Battery),
        },
        ProbeDescriptor {
            kind: ProbeKind::Screen,
            run: |ctx| screen::probe(ctx).map(ProbeOutput::Screen),
        },
        ProbeDescriptor {
            kind: ProbeKind::Apps,
            run: |ctx| apps::probe(ctx).map(ProbeOutput::Apps),
        },
        ProbeDescriptor {
            kind: ProbeKind::Focus,
            run: |ctx| focus::probe(ctx).map(ProbeOutput::Focus),
        },
        ProbeDescriptor {
            kind: ProbeKind::Media,
            run: |ctx| media::probe(ctx).map(ProbeOutput::Media),
        },
        ProbeDescriptor {
            kind: ProbeKind::Network,
            run: |ctx| network::probe(ctx).map(ProbeOutput::Network),
        },
        ProbeDescriptor {
            kind: ProbeKind::Browsers,
            run: |ctx| browsers::probe(ctx).map(ProbeOutput::Browsers),
        },
        ProbeDescriptor {
            kind: ProbeKind::Notifications,
            run: |ctx| notifications::probe(ctx).map(ProbeOutput::Notifications),
        },
        ProbeDescriptor {
            kind: ProbeKind::Issues,
            run: |ctx| issues::probe(ctx).map(ProbeOutput::Issues),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTiming {
    pub kind: ProbeKind,
    pub elapsed: Duration,
}

/// One result slot per probe. A slot that no probe filled reports
/// "not collected".
#[derive(Debug, Clone)]
pub struct CollectedDay {
    pub uptime: Probed<UptimeSection>,
    pub battery: Probed<BatterySection>,
    pub screen: Probed<ScreenSection>,
    pub apps: Probed<AppsSection>,
    pub focus: Probed<FocusSection>,
    pub media: Probed<MediaSection>,
    pub network: Probed<NetworkSection>,
    pub browsers: Probed<BrowsersSection>,
    pub notifications: Probed<NotificationsSection>,
    pub issues: Probed<IssuesSection>,
    pub timings: Vec<ProbeTiming>,
}

fn missing<T>() -> Probed<T> {
    Err(ProbeError::unavailable("not collected"))
}

impl Default for CollectedDay {
    fn default() -> Self {
        Self {
            uptime: missing(),
            battery: missing(),
            screen: missing(),
            apps: missing(),
            focus: missing(),
            media: missing(),
            network: missing(),
            browsers: missing(),
            notifications: missing(),
            issues: missing(),
            timings: Vec::new(),
        }
    }
}

impl CollectedDay {
    pub fn store(&mut self, kind: ProbeKind, result: Probed<ProbeOutput>) {
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                self.set_error(kind, err);
                return;
            }
        };

        match output {
            ProbeOutput::Uptime(s) => self.uptime = Ok(s),
            ProbeOutput::Battery(s) => self.battery = Ok(s),
            ProbeOutput::Screen(s) => self.screen = Ok(s),
            ProbeOutput::Apps(s) => self.apps = Ok(s),
            ProbeOutput::Focus(s) => self.focus = Ok(s),
            ProbeOutput::Media(s) => self.media = Ok(s),
            ProbeOutput::Network(s) => self.network = Ok(s),
            ProbeOutput::Browsers(s) => self.browsers = Ok(s),
            ProbeOutput::Notifications(s) => self.notifications = Ok(s),
            ProbeOutput::Issues(s) => self.issues = Ok(s),
        }
    }

    fn set_error(&mut self, kind: ProbeKind, err: ProbeError) {
        match kind {
            ProbeKind::Uptime => self.uptime = Err(err),
            ProbeKind::Battery => self.battery = Err(err),
            ProbeKind::Screen => self.screen = Err(err),
            ProbeKind::Apps => self.apps = Err(err),
            ProbeKind::Focus => self.focus = Err(err),
            ProbeKind::Media => self.media = Err(err),
            ProbeKind::Network => self.network = Err(err),
            ProbeKind::Browsers => self.browsers = Err(err),
            ProbeKind::Notifications => self.notifications = Err(err),
            ProbeKind::Issues => self.issues = Err(err),
        }
    }

    /// The diagnostic for an unavailable slot, `None` when it has data.
    pub fn error(&self, kind: ProbeKind) -> Option<&ProbeError> {
        match kind {
            ProbeKind::Uptime => self.uptime.as_ref().err(),
            ProbeKind::Battery => self.battery.as_ref().err(),
            ProbeKind::Screen => self.screen.as_ref().err(),
            ProbeKind::Apps => self.apps.as_ref().err(),
            ProbeKind::Focus => self.focus.as_ref().err(),
            ProbeKind::Media => self.media.as_ref().err(),
            ProbeKind::Network => self.network.as_ref().err(),
            ProbeKind::Browsers => self.browsers.as_ref().err(),
            ProbeKind::Notifications => self.notifications.as_ref().err(),
            ProbeKind::Issues => self.issues.as_ref().err(),
        }
    }

    pub fn is_available(&self, kind: ProbeKind) -> bool {
        self.error(kind).is_none()
    }

    pub fn available_count(&self) -> usize {
        ProbeKind::ALL
            .iter()
            .filter(|kind| self.is_available(**kind))
            .count()
    }

    pub fn elapsed(&self, kind: ProbeKind) -> Option<Duration> {
        self.timings
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.elapsed)
    }
}

fn log_outcome(kind: ProbeKind, result: &Probed<ProbeOutput>, elapsed: Duration) {
    match result {
        Ok(_) => debug!(probe = %kind, elapsed_ms = elapsed.as_millis() as u64, "Probe finished"),
        Err(ProbeError::SourceUnavailable(reason)) => {
            info!(probe = %kind, "Source unavailable: {}", reason)
        }
        Err(err) => warn!(probe = %kind, elapsed_ms = elapsed.as_millis() as u64, "Probe failed: {}", err),
    }
}

/// Runs `probes` concurrently and waits at most `timeout` for all of them.
///
/// Never fails: panics, errors and timeouts all land in the probe's slot.
pub async fn collect(
    ctx: Arc<ProbeContext>,
    probes: &[ProbeDescriptor],
    timeout: Duration,
) -> CollectedDay {
    let deadline = tokio::time::Instant::now() + timeout;

    let handles: Vec<_> = probes
        .iter()
        .map(|descriptor| {
            let ctx = Arc::clone(&ctx);
            let ProbeDescriptor { kind, run } = *descriptor;
            let launched = Instant::now();
            let handle = tokio::task::spawn_blocking(move || {
                debug!(probe = %kind, "Probe started");
                let started = Instant::now();
                let result = panic::catch_unwind(AssertUnwindSafe(|| run(&ctx)))
                    .unwrap_or_else(|_| {
                        warn!(probe = %kind, "Probe panicked");
                        Err(ProbeError::unavailable("probe panicked"))
                    });
                (result, started.elapsed())
            });
            (kind, launched, handle)
        })
        .collect();

    let mut day = CollectedDay::default();

    for (kind, launched, handle) in handles {
        let (result, elapsed) = match timeout_at(deadline, handle).await {
            Ok(Ok(finished)) => finished,
            Ok(Err(join_err)) => {
                let reason = if join_err.is_panic() {
                    "probe panicked"
                } else {
                    "probe was aborted"
                };
                warn!(probe = %kind, "{}", reason);
                (Err(ProbeError::unavailable(reason)), launched.elapsed())
            }
            Err(_) => {
                ctx.cancel();
                (Err(ProbeError::Timeout { after: timeout }), timeout)
            }
        };

        log_outcome(kind, &result, elapsed);
        day.timings.push(ProbeTiming { kind, elapsed });
        day.store(kind, result);
    }

    ctx.cancel();
    let swept = ctx.copies().sweep();
    if swept > 0 {
        debug!(swept, "Removed database copies left by unfinished probes");
    }

    info!(
        available = day.available_count(),
        total = probes.len(),
        "Collection finished"
    );

    day
}
