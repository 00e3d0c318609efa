//! Battery readings backed by the `starship-battery` crate.

use std::fmt;

use starship_battery::units::ratio::percent;
use starship_battery::{Manager, State};

use crate::error::{PlatformError, Result};

/// Where the battery's charge is heading at the moment of the reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargeState {
    Charging,
    Discharging,
    Full,
    #[default]
    Unknown,
}

impl ChargeState {
    pub fn label(&self) -> &'static str {
        match self {
            ChargeState::Charging => "Charging",
            ChargeState::Discharging => "On Battery",
            ChargeState::Full => "Full",
            ChargeState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<State> for ChargeState {
    fn from(state: State) -> Self {
        match state {
            State::Charging => ChargeState::Charging,
            // An empty battery is still draining from the system's view.
            State::Discharging | State::Empty => ChargeState::Discharging,
            State::Full => ChargeState::Full,
            State::Unknown => ChargeState::Unknown,
        }
    }
}

/// Battery information snapshot.
#[derive(Debug, Clone, Default)]
pub struct BatteryInfo {
    /// Current charge level as a percentage (0-100).
    pub charge_percent: f32,

    /// Current charging state.
    pub state: ChargeState,

    /// Battery health as a percentage (0-100).
    pub health_percent: f32,

    /// Number of charge cycles, if available.
    pub cycle_count: Option<u32>,
}

/// Trait for battery providers.
pub trait BatteryProvider {
    /// Create a provider and take the first reading.
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Re-read battery information from the system.
    fn refresh(&mut self) -> Result<()>;

    /// Get the most recent reading.
    fn info(&self) -> &BatteryInfo;
}

/// Reads the first battery the OS reports.
pub struct SystemBattery {
    info: BatteryInfo,
    manager: Manager,
}

impl BatteryProvider for SystemBattery {
    fn new() -> Result<Self> {
        let manager = Manager::new().map_err(|e| PlatformError::Battery(e.to_string()))?;
        let mut provider = Self {
            info: BatteryInfo::default(),
            manager,
        };
        provider.refresh()?;
        Ok(provider)
    }

    fn refresh(&mut self) -> Result<()> {
        let mut battery = self
            .manager
            .batteries()
            .map_err(|e| PlatformError::Battery(e.to_string()))?
            .next()
            .ok_or(PlatformError::NoBattery)?
            .map_err(|e| PlatformError::Battery(e.to_string()))?;

        self.manager
            .refresh(&mut battery)
            .map_err(|e| PlatformError::Battery(e.to_string()))?;

        self.info = BatteryInfo {
            charge_percent: battery.state_of_charge().get::<percent>(),
            state: ChargeState::from(battery.state()),
            health_percent: battery.state_of_health().get::<percent>(),
            cycle_count: battery.cycle_count(),
        };

        Ok(())
    }

    fn info(&self) -> &BatteryInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(ChargeState::from(State::Empty), ChargeState::Discharging);
        assert_eq!(ChargeState::from(State::Full).to_string(), "Full");
        assert_eq!(ChargeState::default().label(), "Unknown");
    }
}
