pub mod apps;
pub mod battery;
pub mod browsers;
pub mod collector;
pub mod db_copy;
pub mod focus;
pub mod interval_store;
pub mod issues;
pub mod media;
pub mod network;
pub mod notifications;
pub mod power_log;
pub mod probe;
pub mod screen;
pub mod uptime;

pub use collector::{collect, default_probes, CollectedDay};
pub use interval_store::ActivityInterval;
pub use probe::{ProbeContext, ProbeError, ProbeKind};
