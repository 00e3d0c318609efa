//! OS adapters for daytrace.
//!
//! This crate holds the thin, probe-agnostic pieces of platform access:
//! battery readings, running command-line tools, and the locations of the
//! macOS databases the probes read.
//!
//! # Example
//!
//! ```ignore
//! use daytrace_platform::{BatteryProvider, SystemBattery};
//!
//! let battery = SystemBattery::new()?;
//! println!("Charge: {}%", battery.info().charge_percent);
//! ```

mod battery;
mod error;

pub mod command;
pub mod paths;

pub use battery::{BatteryInfo, BatteryProvider, ChargeState, SystemBattery};
pub use error::{PlatformError, Result};
