use daytrace_platform::{BatteryInfo, BatteryProvider, SystemBattery};
use daytrace_protocol::BatterySection;

use super::probe::{ProbeContext, Probed};

pub fn section(info: &BatteryInfo) -> BatterySection {
    BatterySection {
        charge_percent: info.charge_percent.clamp(0.0, 100.0),
        state: info.state.label().to_string(),
        health_percent: info.health_percent.clamp(0.0, 100.0),
        cycle_count: info.cycle_count,
    }
}

pub fn probe(ctx: &ProbeContext) -> Probed<BatterySection> {
    ctx.checkpoint()?;
    let battery = SystemBattery::new()?;
    Ok(section(battery.info()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daytrace_platform::ChargeState;

    #[test]
    fn test_section_from_reading() {
        let info = BatteryInfo {
            charge_percent: 82.5,
            state: ChargeState::Discharging,
            health_percent: 101.2,
            cycle_count: Some(312),
        };
        let section = section(&info);

        assert_eq!(section.charge_percent, 82.5);
        assert_eq!(section.state, "On Battery");
        assert_eq!(section.health_percent, 100.0);
        assert_eq!(section.cycle_count, Some(312));
    }
}
